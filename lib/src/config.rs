//! The dashboard's configuration file.
//!
//! ```toml
//! [input]
//! path = "data/requests.xlsx"
//!
//! [selection]
//! law_schools = ["Yale"]
//!
//! [report]
//! top_k = 5
//! missing_values = "pairwise_complete"
//! ```
use crate::{filter::Selection, report::ReportConfig, Result};
use qu::ick_use::*;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input: InputConfig,
    pub selection: Selection,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// A workbook, a CSV file, or a `.bin` snapshot.
    pub path: Option<PathBuf>,
    /// Worksheet to read. The first sheet is used if missing.
    pub sheet: Option<String>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        fn inner(path: &Path) -> Result<Config> {
            let text = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&text)?;
            event!(Level::DEBUG, "loaded config {:?}", config);
            Ok(config)
        }
        let path = path.as_ref();
        inner(path).with_context(|| format!("loading config from \"{}\"", path.display()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        correlate::MissingValues,
        feature::{Feature, ListField},
        indicator::Indicator,
    };

    #[test]
    fn empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.report.top_k, 10);
        assert_eq!(config.report.missing_values, MissingValues::ZeroFill);
    }

    #[test]
    fn full_config() {
        let config: Config = toml::from_str(
            r#"
            [input]
            path = "requests.xlsx"
            sheet = "2023"

            [selection]
            request_types = ["New Request"]

            [report]
            top_k = 3
            list_field = "accommodations"
            correlation_target = "is_any_approved"
            correlation_features = ["extended_time", "accommodation_count", "is_any_approved"]
            missing_values = "pairwise_complete"
            "#,
        )
        .unwrap();
        assert_eq!(config.input.path, Some(PathBuf::from("requests.xlsx")));
        assert_eq!(config.input.sheet.as_deref(), Some("2023"));
        assert!(config.selection.law_schools.is_none());
        assert_eq!(config.report.top_k, 3);
        assert_eq!(config.report.list_field, ListField::Accommodations);
        assert_eq!(
            config.report.correlation_target,
            Feature::Indicator(Indicator::AnyApproved)
        );
        assert_eq!(config.report.correlation_features.len(), 3);
        assert_eq!(config.report.missing_values, MissingValues::PairwiseComplete);
    }

    #[test]
    fn example_config_parses() {
        let config: Config = toml::from_str(include_str!("../../data/dashboard.toml")).unwrap();
        assert_eq!(config.report, ReportConfig::default());
        assert_eq!(config.selection.approval_statuses.unwrap().len(), 3);
    }

    #[test]
    fn unknown_names_fail() {
        assert!(toml::from_str::<Config>("[report]\ncorrelation_target = \"age\"").is_err());
        assert!(toml::from_str::<Config>("[report]\nlist_field = \"diagnosis\"").is_err());
        assert!(toml::from_str::<Config>("[output]\npath = \"x\"").is_err());
    }

    #[test]
    fn load_reports_path() {
        let err = Config::load("does/not/exist.toml").unwrap_err();
        assert!(format!("{:#}", err).contains("does/not/exist.toml"));
    }
}
