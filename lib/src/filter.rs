//! Choosing which requests to analyse.
use crate::{
    derive::{derive, DerivedRequests},
    Request, Requests,
};
use qu::ick_use::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Allowed values for each categorical field.
///
/// `None` lets everything through. `Some(set)` only lets through rows whose field is present
/// and in the set, so an empty set selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Selection {
    pub law_schools: Option<BTreeSet<String>>,
    pub request_types: Option<BTreeSet<String>>,
    pub approval_statuses: Option<BTreeSet<String>>,
}

impl Selection {
    /// Everything.
    pub fn all() -> Self {
        Selection::default()
    }

    pub fn matches(&self, request: &Request) -> bool {
        fn allowed(allowed: &Option<BTreeSet<String>>, value: Option<&str>) -> bool {
            match allowed {
                None => true,
                Some(set) => matches!(value, Some(value) if set.contains(value)),
            }
        }
        allowed(&self.law_schools, request.law_school.as_deref())
            && allowed(&self.request_types, request.request_type.as_deref())
            && allowed(&self.approval_statuses, request.approval_status.as_deref())
    }

    pub fn apply(&self, requests: &Requests) -> Requests {
        requests.filter(|request| self.matches(request))
    }
}

/// The loaded requests, and the derived rows for the current selection.
///
/// Deriving is only redone when the selection changes.
#[derive(Debug, Clone)]
pub struct Session {
    requests: Requests,
    cache: Option<(Selection, DerivedRequests)>,
}

impl Session {
    pub fn new(requests: Requests) -> Self {
        Session {
            requests,
            cache: None,
        }
    }

    pub fn requests(&self) -> &Requests {
        &self.requests
    }

    /// The derived rows for `selection`.
    pub fn derived(&mut self, selection: &Selection) -> &DerivedRequests {
        if !matches!(&self.cache, Some((cached, _)) if cached == selection) {
            self.cache = None;
        }
        let requests = &self.requests;
        let (_, rows) = self.cache.get_or_insert_with(|| {
            let selected = selection.apply(requests);
            event!(
                Level::DEBUG,
                "selection matched {} of {} requests",
                selected.len(),
                requests.len()
            );
            (selection.clone(), derive(&selected))
        });
        rows
    }
}
