//! Boolean indicators derived from the text fields.
//!
//! All indicators are declared once in `TABLE`: which field they read, and what they look for.
//! Matching is case sensitive.
use crate::{error::ConfigError, parse::has_keyword, Request};
use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, str::FromStr};

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub enum Indicator {
    // accommodations
    ExtendedTime,
    Laptop,
    ReducedDistraction,
    ScheduledBreaks,
    LargePrint,
    Medication,
    // diagnoses
    Adhd,
    Anxiety,
    Depression,
    PhysicalCondition,
    // request type
    NewRequest,
    RetakeSame,
    RetakeChanged,
    // approval status
    FullyApproved,
    PartiallyApproved,
    PreviouslyExamined,
    AnyApproved,
}

/// The text field an indicator is computed from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Source {
    Accommodations,
    Diagnosis,
    RequestType,
    ApprovalStatus,
}

impl Source {
    pub fn text(self, request: &Request) -> Option<&str> {
        let field = match self {
            Source::Accommodations => &request.requested_accommodations,
            Source::Diagnosis => &request.diagnosis,
            Source::RequestType => &request.request_type,
            Source::ApprovalStatus => &request.approval_status,
        };
        field.as_deref()
    }
}

/// How an indicator detects a match.
#[derive(Debug, Copy, Clone)]
enum Rule {
    /// A regular expression found anywhere in the text.
    Regex(&'static str),
    /// Any of a fixed set of keywords.
    AnyOf(&'static [&'static str]),
}

const PHYSICAL_KEYWORDS: &[&str] = &[
    "Physical",
    "Chronic",
    "Pain",
    "Injury",
    "Mobility",
    "Visual",
    "Vision",
    "Hearing",
    "Migraine",
    "Surgery",
    "Concussion",
];

/// Indicator, name, source field and rule, in `Indicator` declaration order.
const TABLE: [(Indicator, &str, Source, Rule); 17] = {
    use Indicator::*;
    use Source::*;
    [
        (ExtendedTime, "has_extended_time", Accommodations, Rule::Regex("Extended Time")),
        (Laptop, "has_laptop", Accommodations, Rule::Regex("Laptop")),
        (
            ReducedDistraction,
            "has_reduced_distraction",
            Accommodations,
            Rule::Regex("Reduced Distraction"),
        ),
        (ScheduledBreaks, "has_scheduled_breaks", Accommodations, Rule::Regex("Breaks")),
        (LargePrint, "has_large_print", Accommodations, Rule::Regex("Large Print")),
        (Medication, "has_medication", Accommodations, Rule::Regex("Medication")),
        (Adhd, "has_adhd", Diagnosis, Rule::Regex("ADHD")),
        (Anxiety, "has_anxiety", Diagnosis, Rule::Regex("Anxiety")),
        (Depression, "has_depression", Diagnosis, Rule::Regex("Depression")),
        (
            PhysicalCondition,
            "has_physical_condition",
            Diagnosis,
            Rule::AnyOf(PHYSICAL_KEYWORDS),
        ),
        (NewRequest, "is_new_request", RequestType, Rule::Regex(r"^New Request$")),
        (
            RetakeSame,
            "is_retake_same",
            RequestType,
            Rule::Regex(r"^Retake - Same Request$"),
        ),
        (
            RetakeChanged,
            "is_retake_changed",
            RequestType,
            Rule::Regex(r"^Retake - Changed Request$"),
        ),
        (FullyApproved, "is_fully_approved", ApprovalStatus, Rule::Regex(r"^Appv\.$")),
        (
            PartiallyApproved,
            "is_partially_approved",
            ApprovalStatus,
            Rule::Regex(r"^Appv\. Part$"),
        ),
        (
            PreviouslyExamined,
            "is_previously_examined",
            ApprovalStatus,
            Rule::Regex(r"^Prev\. Exam$"),
        ),
        (AnyApproved, "is_any_approved", ApprovalStatus, Rule::Regex(r"^Appv\.( Part)?$")),
    ]
};

enum Matcher {
    Regex(Regex),
    AnyOf(AhoCorasick),
}

impl Matcher {
    fn is_match(&self, text: Option<&str>) -> bool {
        match self {
            Matcher::Regex(re) => has_keyword(text, re),
            Matcher::AnyOf(ac) => matches!(text, Some(text) if ac.is_match(text)),
        }
    }
}

/// Compiled rules, indexed by `Indicator as usize`.
static MATCHERS: Lazy<Vec<Matcher>> = Lazy::new(|| {
    TABLE
        .iter()
        .map(|(_, _, _, rule)| match rule {
            Rule::Regex(re) => Matcher::Regex(Regex::new(re).unwrap()),
            Rule::AnyOf(keywords) => Matcher::AnyOf(AhoCorasick::new(keywords.iter())),
        })
        .collect()
});

impl Indicator {
    pub const ALL: [Indicator; 17] = {
        let mut all = [Indicator::ExtendedTime; 17];
        let mut idx = 0;
        while idx < TABLE.len() {
            all[idx] = TABLE[idx].0;
            idx += 1;
        }
        all
    };

    pub fn name(self) -> &'static str {
        TABLE[self as usize].1
    }

    pub fn source(self) -> Source {
        TABLE[self as usize].2
    }

    /// Test the indicator against a request. A missing source field is never a match.
    pub fn test(self, request: &Request) -> bool {
        MATCHERS[self as usize].is_match(self.source().text(request))
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Indicator {
    type Err = ConfigError;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        Indicator::ALL
            .iter()
            .copied()
            .find(|ind| ind.name() == input)
            .ok_or_else(|| ConfigError::UnknownIndicator(input.to_string()))
    }
}
