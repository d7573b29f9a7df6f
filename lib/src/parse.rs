//! Extract values from the free text fields.
//!
//! None of these fail: text that doesn't match degrades to `None`, `0`, `false` or an empty list.
use crate::ArcStr;
use once_cell::sync::Lazy;
use regex::Regex;

static EXTENDED_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)%\s+Extended Time").unwrap());
static NCBE_SEQUENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"N([0-9]+)").unwrap());

/// The percentage from the first "<n>% Extended Time" in the text.
///
/// Later mentions are ignored, not summed.
pub fn parse_extended_time(text: Option<&str>) -> Option<u32> {
    let caps = EXTENDED_TIME.captures(text?)?;
    caps.get(1)?.as_str().parse().ok()
}

/// Like `parse_extended_time`, but `0` when there is no match.
pub fn parse_extended_time_or_zero(text: Option<&str>) -> u32 {
    parse_extended_time(text).unwrap_or(0)
}

/// Split a comma separated list, trimming each entry.
///
/// Entries that are empty after trimming are dropped. Order and duplicates are kept.
pub fn parse_diagnoses(text: Option<&str>) -> Vec<ArcStr> {
    split_list(text)
}

pub(crate) fn split_list(text: Option<&str>) -> Vec<ArcStr> {
    let text = match text {
        Some(text) => text,
        None => return vec![],
    };
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ArcStr::from)
        .collect()
}

/// The number of comma separated segments.
///
/// This counts delimiters, not distinct accommodations, so "50% Extended Time, Laptop" is 2
/// whatever the segments say.
pub fn count_accommodations(text: Option<&str>) -> usize {
    match text {
        Some(text) if !text.is_empty() => text.split(',').count(),
        _ => 0,
    }
}

/// The number after the first `N` directly followed by digits, or `0`.
pub fn parse_ncbe_sequence(text: Option<&str>) -> u64 {
    text.and_then(|text| NCBE_SEQUENCE.captures(text))
        .and_then(|caps| caps.get(1)?.as_str().parse().ok())
        .unwrap_or(0)
}

/// Case sensitive search for `pattern` anywhere in the text.
pub fn has_keyword(text: Option<&str>, pattern: &Regex) -> bool {
    matches!(text, Some(text) if pattern.is_match(text))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn extended_time() {
        assert_eq!(
            parse_extended_time(Some("37% Extended Time, Laptop")),
            Some(37)
        );
        assert_eq!(
            parse_extended_time(Some("Laptop, 50%  Extended Time")),
            Some(50)
        );
        // first match only
        assert_eq!(
            parse_extended_time(Some("25% Extended Time, 100% Extended Time")),
            Some(25)
        );
        assert_eq!(parse_extended_time(Some("50%Extended Time")), None);
        assert_eq!(parse_extended_time(Some("50% extended time")), None);
        assert_eq!(parse_extended_time(Some("Extended Time")), None);
        assert_eq!(parse_extended_time(Some("")), None);
        assert_eq!(parse_extended_time(None), None);
    }

    #[test]
    fn only_ascii_digits_match() {
        assert_eq!(parse_extended_time(Some("٥٠% Extended Time")), None);
        // a non-ascii number must not hide a later ascii one
        assert_eq!(
            parse_extended_time(Some("٥٠% Extended Time, 50% Extended Time")),
            Some(50)
        );
        assert_eq!(parse_ncbe_sequence(Some("N٣ N12")), 12);
    }

    #[test]
    fn extended_time_or_zero() {
        assert_eq!(parse_extended_time_or_zero(Some("Laptop")), 0);
        assert_eq!(parse_extended_time_or_zero(None), 0);
        assert_eq!(parse_extended_time_or_zero(Some("100% Extended Time")), 100);
    }

    #[test]
    fn diagnoses() {
        let parsed = parse_diagnoses(Some("ADHD, Anxiety , Depression"));
        let parsed: Vec<&str> = parsed.iter().map(|s| &**s).collect();
        assert_eq!(parsed, ["ADHD", "Anxiety", "Depression"]);

        let parsed = parse_diagnoses(Some("ADHD,ADHD"));
        assert_eq!(parsed.len(), 2);
        assert!(parse_diagnoses(None).is_empty());
        assert!(parse_diagnoses(Some("")).is_empty());
    }

    #[test]
    fn accommodation_count() {
        assert_eq!(count_accommodations(None), 0);
        assert_eq!(count_accommodations(Some("")), 0);
        assert_eq!(count_accommodations(Some("A, B, C")), 3);
        assert_eq!(count_accommodations(Some("50% Extended Time")), 1);
    }

    #[test]
    fn ncbe_sequence() {
        assert_eq!(parse_ncbe_sequence(Some("N12345")), 12345);
        assert_eq!(parse_ncbe_sequence(Some("ID: N0042-B")), 42);
        assert_eq!(parse_ncbe_sequence(Some("n12345")), 0);
        assert_eq!(parse_ncbe_sequence(Some("N")), 0);
        assert_eq!(parse_ncbe_sequence(None), 0);
    }

    #[test]
    fn keywords() {
        let laptop = Regex::new("Laptop").unwrap();
        assert!(has_keyword(Some("50% Extended Time, Laptop"), &laptop));
        assert!(!has_keyword(Some("laptop"), &laptop));
        assert!(!has_keyword(None, &laptop));
    }
}
