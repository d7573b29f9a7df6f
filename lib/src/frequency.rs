use crate::{
    derive::DerivedRequest,
    error::ConfigError,
    feature::{Label, ListField},
    table::Counts,
    Result,
};
use qu::ick_use::*;

/// The `k` most common entries of a list field across all rows.
///
/// Ties are broken by which entry was seen first. If there are fewer than `k` distinct entries,
/// all of them are returned.
pub fn top_k(rows: &[DerivedRequest], field: ListField, k: usize) -> Result<Counts> {
    ensure!(k > 0, ConfigError::InvalidTopK);
    let counts = Counts::tally(
        rows.iter()
            .flat_map(|row| field.values(row))
            .map(|value| Label::Text(value.clone())),
    );
    event!(
        Level::TRACE,
        "{} distinct {}, keeping {}",
        counts.rows.len(),
        field,
        k
    );
    Ok(counts.truncate(k))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{derive::derive, Request, Requests};

    fn diagnoses(texts: &[&str]) -> Vec<DerivedRequest> {
        let requests: Requests = texts
            .iter()
            .map(|text| Request {
                diagnosis: Some((*text).into()),
                ..Default::default()
            })
            .collect();
        derive(&requests).to_vec()
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let rows = diagnoses(&["ADHD, Anxiety", "ADHD", "Depression"]);
        let top = top_k(&rows, ListField::Diagnoses, 3).unwrap();
        let got: Vec<(String, usize)> = top
            .rows
            .iter()
            .map(|row| (row.label.to_string(), row.count))
            .collect();
        assert_eq!(
            got,
            [
                ("ADHD".to_string(), 2),
                ("Anxiety".to_string(), 1),
                ("Depression".to_string(), 1)
            ]
        );
    }

    #[test]
    fn k_larger_than_distinct() {
        let rows = diagnoses(&["ADHD, Anxiety", "ADHD"]);
        assert_eq!(top_k(&rows, ListField::Diagnoses, 10).unwrap().rows.len(), 2);
        assert_eq!(top_k(&rows, ListField::Diagnoses, 1).unwrap().rows.len(), 1);
        assert!(top_k(&[], ListField::Diagnoses, 5).unwrap().is_empty());
    }

    #[test]
    fn accommodations_are_counted_too() {
        let rows = derive(&crate::derive::test::sample());
        let top = top_k(&rows, ListField::Accommodations, 10).unwrap();
        assert_eq!(top.get(&Label::from("Laptop")), Some(1));
        assert_eq!(top.total(), 4);
    }

    #[test]
    fn zero_k_is_an_error() {
        let rows = diagnoses(&["ADHD"]);
        let err = top_k(&rows, ListField::Diagnoses, 0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::InvalidTopK)
        ));
    }
}
