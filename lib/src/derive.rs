//! Augment requests with the values extracted from their text fields.
use crate::{
    indicator::Indicator,
    parse::{
        count_accommodations, parse_diagnoses, parse_extended_time, parse_ncbe_sequence,
        split_list,
    },
    ArcStr, Request, Requests,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, ops::Deref, sync::Arc};

/// A request plus everything we compute from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedRequest {
    pub request: Request,
    /// Present only when the accommodations mention "<n>% Extended Time".
    pub extended_time: Option<u32>,
    pub accommodation_count: usize,
    /// `0` if the NCBE ID has no sequence number.
    pub ncbe_sequence: u64,
    pub diagnoses: Vec<ArcStr>,
    pub accommodations: Vec<ArcStr>,
    /// The indicators that matched.
    pub indicators: BTreeSet<Indicator>,
}

impl DerivedRequest {
    /// Only the text fields of the request are read.
    pub fn from_request(request: &Request) -> Self {
        let accommodations = request.requested_accommodations.as_deref();
        DerivedRequest {
            request: request.clone(),
            extended_time: parse_extended_time(accommodations),
            accommodation_count: count_accommodations(accommodations),
            ncbe_sequence: parse_ncbe_sequence(request.ncbe_id.as_deref()),
            diagnoses: parse_diagnoses(request.diagnosis.as_deref()),
            accommodations: split_list(accommodations),
            indicators: Indicator::ALL
                .into_iter()
                .filter(|ind| ind.test(request))
                .collect(),
        }
    }

    pub fn has(&self, indicator: Indicator) -> bool {
        self.indicators.contains(&indicator)
    }
}

/// The derived rows for one selection of requests, in the same order as the requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedRequests {
    els: Arc<Vec<DerivedRequest>>,
}

impl DerivedRequests {
    pub fn iter(&self) -> impl Iterator<Item = &DerivedRequest> + '_ {
        self.els.iter()
    }

    /// Get a `DerivedRequests` object containing only rows that match the filter.
    pub fn filter(&self, f: impl Fn(&DerivedRequest) -> bool) -> Self {
        self.iter().filter(|row| f(row)).cloned().collect()
    }

    /// Rows that have an extended time percentage.
    pub fn with_extended_time(&self) -> Self {
        self.filter(|row| row.extended_time.is_some())
    }
}

impl Deref for DerivedRequests {
    type Target = [DerivedRequest];
    fn deref(&self) -> &Self::Target {
        &self.els
    }
}

impl<'a> IntoIterator for &'a DerivedRequests {
    type IntoIter = <&'a [DerivedRequest] as IntoIterator>::IntoIter;
    type Item = &'a DerivedRequest;
    fn into_iter(self) -> Self::IntoIter {
        self.els.iter()
    }
}

impl FromIterator<DerivedRequest> for DerivedRequests {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = DerivedRequest>,
    {
        DerivedRequests {
            els: Arc::new(iter.into_iter().collect()),
        }
    }
}

/// Run every field parser over every request.
///
/// Pure: the same requests always give the same rows.
pub fn derive(requests: &Requests) -> DerivedRequests {
    requests.iter().map(DerivedRequest::from_request).collect()
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    pub(crate) fn sample() -> Requests {
        let req = |school: &str, kind: &str, status: &str, accs: &str, diag: &str, ncbe: &str| {
            let opt = |s: &str| if s.is_empty() { None } else { Some(ArcStr::from(s)) };
            Request {
                file_name: opt("file.pdf"),
                law_school: opt(school),
                request_type: opt(kind),
                approval_status: opt(status),
                requested_accommodations: opt(accs),
                diagnosis: opt(diag),
                ncbe_id: opt(ncbe),
            }
        };
        vec![
            req(
                "Yale",
                "New Request",
                "Appv.",
                "50% Extended Time, Laptop",
                "ADHD, Anxiety",
                "N100",
            ),
            req(
                "Yale",
                "Retake - Same Request",
                "Appv. Part",
                "25% Extended Time",
                "ADHD",
                "N7",
            ),
            req("Duke", "New Request", "Prev. Exam", "Large Print", "Depression", ""),
            req("", "", "", "", "", "bogus"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn derives_all_fields() {
        let rows = derive(&sample());
        assert_eq!(rows.len(), 4);

        let first = &rows[0];
        assert_eq!(first.extended_time, Some(50));
        assert_eq!(first.accommodation_count, 2);
        assert_eq!(first.ncbe_sequence, 100);
        assert_eq!(first.diagnoses.len(), 2);
        assert!(first.has(Indicator::Laptop));
        assert!(first.has(Indicator::NewRequest));
        assert!(first.has(Indicator::FullyApproved));
        assert!(first.has(Indicator::AnyApproved));

        let third = &rows[2];
        assert_eq!(third.extended_time, None);
        assert_eq!(third.ncbe_sequence, 0);
        assert!(third.has(Indicator::LargePrint));
        assert!(third.has(Indicator::PreviouslyExamined));
        assert!(!third.has(Indicator::AnyApproved));
    }

    #[test]
    fn empty_request_degrades() {
        let rows = derive(&sample());
        let empty = &rows[3];
        assert_eq!(empty.extended_time, None);
        assert_eq!(empty.accommodation_count, 0);
        assert_eq!(empty.ncbe_sequence, 0);
        assert!(empty.diagnoses.is_empty());
        assert!(empty.indicators.is_empty());
    }

    #[test]
    fn derive_is_repeatable() {
        let requests = sample();
        assert_eq!(derive(&requests), derive(&requests));
    }

    #[test]
    fn keeps_input_order() {
        let requests = sample();
        let rows = derive(&requests);
        for (req, row) in requests.iter().zip(rows.iter()) {
            assert_eq!(req, &row.request);
        }
    }
}
