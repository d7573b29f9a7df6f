//! Typed names for the columns the pipeline can be asked about.
//!
//! Anything that arrives as a string (config files, command line) is parsed into one of these
//! up front, so an unknown name fails immediately instead of deep inside an aggregation.
use crate::{
    derive::DerivedRequest, error::ConfigError, indicator::Indicator,
    parse::parse_extended_time_or_zero, ArcStr,
};
use itertools::chain;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, str::FromStr};

/// A numeric feature of a derived request. Indicators count as `0.` or `1.`.
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
pub enum Feature {
    /// Extended time percentage. Absent when the request doesn't ask for extended time.
    ExtendedTime,
    AccommodationCount,
    NcbeSequence,
    Indicator(Indicator),
}

impl Feature {
    /// Extended time plus request type and approval memberships.
    pub const EXTENDED_TIME_CORRELATES: [Feature; 7] = [
        Feature::ExtendedTime,
        Feature::Indicator(Indicator::FullyApproved),
        Feature::Indicator(Indicator::PartiallyApproved),
        Feature::Indicator(Indicator::PreviouslyExamined),
        Feature::Indicator(Indicator::NewRequest),
        Feature::Indicator(Indicator::RetakeSame),
        Feature::Indicator(Indicator::RetakeChanged),
    ];

    /// Every feature, in a stable order.
    pub fn all() -> impl Iterator<Item = Feature> {
        chain(
            [
                Feature::ExtendedTime,
                Feature::AccommodationCount,
                Feature::NcbeSequence,
            ],
            Indicator::ALL.into_iter().map(Feature::Indicator),
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::ExtendedTime => "extended_time",
            Feature::AccommodationCount => "accommodation_count",
            Feature::NcbeSequence => "ncbe_sequence",
            Feature::Indicator(ind) => ind.name(),
        }
    }

    /// The value of this feature, or `None` if it is missing for this request.
    pub fn value(self, row: &DerivedRequest) -> Option<f64> {
        match self {
            Feature::ExtendedTime => row.extended_time.map(f64::from),
            Feature::AccommodationCount => Some(row.accommodation_count as f64),
            Feature::NcbeSequence => Some(row.ncbe_sequence as f64),
            Feature::Indicator(ind) => Some(if row.has(ind) { 1. } else { 0. }),
        }
    }

    /// The value of this feature with missing values read as `0.`.
    pub fn value_or_zero(self, row: &DerivedRequest) -> f64 {
        match self {
            Feature::ExtendedTime => {
                parse_extended_time_or_zero(row.request.requested_accommodations.as_deref()).into()
            }
            other => other.value(row).unwrap_or(0.),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = ConfigError;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "extended_time" => Ok(Feature::ExtendedTime),
            "accommodation_count" => Ok(Feature::AccommodationCount),
            "ncbe_sequence" => Ok(Feature::NcbeSequence),
            other => other
                .parse::<Indicator>()
                .map(Feature::Indicator)
                .map_err(|_| ConfigError::UnknownFeature(other.to_string())),
        }
    }
}

/// A categorical field requests can be grouped by.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum Category {
    LawSchool,
    RequestType,
    ApprovalStatus,
    /// The extended time percentage, treated as a category.
    ExtendedTime,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Category::LawSchool => "law_school",
            Category::RequestType => "request_type",
            Category::ApprovalStatus => "approval_status",
            Category::ExtendedTime => "extended_time",
        }
    }

    /// The label of this request, or `None` if the field is missing.
    pub fn label(self, row: &DerivedRequest) -> Option<Label> {
        let text = match self {
            Category::LawSchool => &row.request.law_school,
            Category::RequestType => &row.request.request_type,
            Category::ApprovalStatus => &row.request.approval_status,
            Category::ExtendedTime => return row.extended_time.map(|v| Label::Number(v.into())),
        };
        text.clone().map(Label::Text)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = ConfigError;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "law_school" => Ok(Category::LawSchool),
            "request_type" => Ok(Category::RequestType),
            "approval_status" => Ok(Category::ApprovalStatus),
            "extended_time" => Ok(Category::ExtendedTime),
            other => Err(ConfigError::UnknownCategory(other.to_string())),
        }
    }
}

/// A field holding a comma separated list.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum ListField {
    Diagnoses,
    Accommodations,
}

impl ListField {
    pub fn name(self) -> &'static str {
        match self {
            ListField::Diagnoses => "diagnoses",
            ListField::Accommodations => "accommodations",
        }
    }

    pub fn values(self, row: &DerivedRequest) -> &[ArcStr] {
        match self {
            ListField::Diagnoses => &row.diagnoses,
            ListField::Accommodations => &row.accommodations,
        }
    }
}

impl fmt::Display for ListField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ListField {
    type Err = ConfigError;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim() {
            "diagnoses" => Ok(ListField::Diagnoses),
            "accommodations" => Ok(ListField::Accommodations),
            other => Err(ConfigError::UnknownListField(other.to_string())),
        }
    }
}

/// A categorical value in an output table.
///
/// Numbers sort numerically and before text.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Number(u64),
    Text(ArcStr),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Label::Number(n) => write!(f, "{}", n),
            Label::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::Text(s.into())
    }
}

impl From<u64> for Label {
    fn from(n: u64) -> Self {
        Label::Number(n)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{derive::DerivedRequest, Request};

    #[test]
    fn feature_names() {
        for feature in Feature::all() {
            assert_eq!(feature.name().parse::<Feature>().unwrap(), feature);
        }
        assert_eq!(
            "is_fully_approved".parse::<Feature>().unwrap(),
            Feature::Indicator(Indicator::FullyApproved)
        );
        assert!(matches!(
            "Extended_Time_Percent".parse::<Feature>(),
            Err(ConfigError::UnknownFeature(_))
        ));
        assert!(matches!(
            "school".parse::<Category>(),
            Err(ConfigError::UnknownCategory(_))
        ));
        assert!(matches!(
            "diagnosis".parse::<ListField>(),
            Err(ConfigError::UnknownListField(_))
        ));
    }

    #[test]
    fn extended_time_missing_vs_zero() {
        let row = DerivedRequest::from_request(&Request {
            requested_accommodations: Some("Laptop".into()),
            ..Default::default()
        });
        assert_eq!(Feature::ExtendedTime.value(&row), None);
        assert_eq!(Feature::ExtendedTime.value_or_zero(&row), 0.);
        assert_eq!(Category::ExtendedTime.label(&row), None);
        assert_eq!(
            Feature::Indicator(Indicator::Laptop).value(&row),
            Some(1.)
        );
        assert_eq!(Feature::AccommodationCount.value(&row), Some(1.));

        let row = DerivedRequest::from_request(&Request {
            requested_accommodations: Some("Laptop, 25% Extended Time".into()),
            ..Default::default()
        });
        assert_eq!(Feature::ExtendedTime.value(&row), Some(25.));
        assert_eq!(Feature::ExtendedTime.value_or_zero(&row), 25.);
    }

    #[test]
    fn labels_sort_numbers_numerically() {
        let mut labels = vec![Label::from(100), Label::from("Yale"), Label::from(25)];
        labels.sort();
        assert_eq!(
            labels,
            [Label::from(25), Label::from(100), Label::from("Yale")]
        );
    }
}
