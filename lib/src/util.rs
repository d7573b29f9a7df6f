use crate::ArcStr;
use calamine::DataType;
use serde::{Deserialize, Deserializer};
use std::{fs, io, path::Path};

/// Converts a not found error to Ok(false)
pub fn path_exists(path: &Path) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound) => Ok(false),
        Err(e) => Err(e),
    }
}

// Helpers for reading fields with quirks.

/// Trim text, mapping "" and "null" to `None`.
fn non_empty(s: &str) -> Option<ArcStr> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("null") || s.is_empty() {
        None
    } else {
        Some(s.into())
    }
}

/// Parse a string, but map "null" to `None` (in addition to the default "" -> None mapping)
pub fn optional_string<'de, D>(d: D) -> Result<Option<ArcStr>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(d)?;
    Ok(non_empty(&s))
}

/// The text of a worksheet cell. Numbers are rendered as they would be displayed.
pub fn cell_text(cell: &DataType) -> Option<ArcStr> {
    match cell {
        DataType::Empty => None,
        DataType::String(s) => non_empty(s),
        other => non_empty(&other.to_string()),
    }
}

/// `part` as a percentage of `whole`. An empty whole gives NaN.
pub fn percentage(part: usize, whole: usize) -> f64 {
    part as f64 / whole as f64 * 100.
}

/// Format a statistic for a terminal table, showing NaN as "-".
pub fn fmt_stat(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{:.2}", value)
    }
}

pub fn header(header: &str) {
    let len = header.len();
    print!("\n{}\n", header);
    for _ in 0..len {
        print!("=");
    }
    println!("\n")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(cell_text(&DataType::Empty), None);
        assert_eq!(cell_text(&DataType::String("  ".into())), None);
        assert_eq!(cell_text(&DataType::String("NULL".into())), None);
        assert_eq!(
            cell_text(&DataType::String(" Yale Law ".into())).as_deref(),
            Some("Yale Law")
        );
        assert_eq!(cell_text(&DataType::Int(7)).as_deref(), Some("7"));
    }

    #[test]
    fn stats_formatting() {
        assert_eq!(fmt_stat(f64::NAN), "-");
        assert_eq!(fmt_stat(12.346), "12.35");
        assert!(percentage(0, 0).is_nan());
        assert_eq!(percentage(1, 4), 25.);
    }
}
