//! All the views of the dashboard, computed from one set of derived rows.
use crate::{
    aggregate::{crosstab, group_stats, value_counts},
    correlate::{correlate_with, MissingValues},
    derive::DerivedRequests,
    error::ConfigError,
    feature::{Category, Feature, ListField},
    frequency::top_k,
    indicator::Indicator,
    table::{Correlation, Counts, Crosstab, GroupStatsTable},
    util::header,
    Result,
};
use qu::ick_use::*;
use serde::{Deserialize, Serialize};

/// What goes in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// How many of the most common list entries to show.
    pub top_k: usize,
    /// The list field to rank.
    pub list_field: ListField,
    /// Features correlated against `correlation_target`.
    pub correlation_features: Vec<Feature>,
    pub correlation_target: Feature,
    /// Features in the full correlation matrix.
    pub matrix_features: Vec<Feature>,
    pub missing_values: MissingValues,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            top_k: 10,
            list_field: ListField::Diagnoses,
            correlation_features: Feature::EXTENDED_TIME_CORRELATES.to_vec(),
            correlation_target: Feature::ExtendedTime,
            matrix_features: Feature::all().collect(),
            missing_values: MissingValues::ZeroFill,
        }
    }
}

impl ReportConfig {
    /// Check the config before doing any work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::InvalidTopK);
        }
        if self.correlation_features.is_empty() || self.matrix_features.is_empty() {
            return Err(ConfigError::NoFeatures);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Rows the report was built from.
    pub requests: usize,
    pub request_types: Counts,
    /// Over requests with extended time, with the fully approved rate.
    pub extended_time_by_law_school: GroupStatsTable,
    /// In order of percentage.
    pub extended_time_distribution: Counts,
    pub top_entries: Counts,
    pub requests_by_law_school: Counts,
    pub approval_by_request_type: Crosstab,
    pub approval_distribution: Counts,
    /// Over requests with extended time.
    pub extended_time_distribution_by_law_school: Crosstab,
    /// Over requests with extended time, with the any approval rate.
    pub extended_time_vs_approval: GroupStatsTable,
    pub extended_time_correlations: Correlation,
    pub correlation_matrix: Correlation,
}

struct Distributions {
    request_types: Counts,
    extended_time_distribution: Counts,
    top_entries: Counts,
    requests_by_law_school: Counts,
    approval_distribution: Counts,
}

struct Groups {
    extended_time_by_law_school: GroupStatsTable,
    approval_by_request_type: Crosstab,
    extended_time_distribution_by_law_school: Crosstab,
    extended_time_vs_approval: GroupStatsTable,
}

impl Report {
    /// Build every view. Views don't depend on each other, so they are computed in parallel.
    pub fn build(rows: &DerivedRequests, config: &ReportConfig) -> Result<Self> {
        config.validate()?;
        event!(Level::INFO, "building report over {} requests", rows.len());
        let with_extended_time = rows.with_extended_time();

        let ((distributions, groups), (extended_time_correlations, correlation_matrix)) =
            rayon::join(
                || {
                    rayon::join(
                        || distributions(rows, config),
                        || groups(rows, &with_extended_time),
                    )
                },
                || {
                    rayon::join(
                        || {
                            correlate_with(
                                rows,
                                &config.correlation_features,
                                Some(config.correlation_target),
                                config.missing_values,
                            )
                        },
                        || correlate_with(rows, &config.matrix_features, None, config.missing_values),
                    )
                },
            );
        let distributions = distributions?;
        event!(Level::DEBUG, "correlations done");

        Ok(Report {
            requests: rows.len(),
            request_types: distributions.request_types,
            extended_time_by_law_school: groups.extended_time_by_law_school,
            extended_time_distribution: distributions.extended_time_distribution,
            top_entries: distributions.top_entries,
            requests_by_law_school: distributions.requests_by_law_school,
            approval_by_request_type: groups.approval_by_request_type,
            approval_distribution: distributions.approval_distribution,
            extended_time_distribution_by_law_school: groups
                .extended_time_distribution_by_law_school,
            extended_time_vs_approval: groups.extended_time_vs_approval,
            extended_time_correlations: extended_time_correlations?,
            correlation_matrix: correlation_matrix?,
        })
    }

    /// Print every view as a terminal table.
    pub fn print(&self) {
        header("Requests");
        println!("total requests: {}", self.requests);

        header("Request types");
        println!("{}", self.request_types.term_table("Request type"));

        header("Extended time by law school");
        println!("{}", self.extended_time_by_law_school.term_table());

        header("Extended time distribution");
        println!(
            "{}",
            self.extended_time_distribution
                .term_table("Extended time (%)")
        );

        header("Top entries");
        println!("{}", self.top_entries.term_table("Entry"));

        header("Requests by law school");
        println!("{}", self.requests_by_law_school.term_table("Law school"));

        header("Approval by request type (%)");
        println!("{}", self.approval_by_request_type.term_table());

        header("Approval distribution");
        println!("{}", self.approval_distribution.term_table("Status"));

        header("Extended time distribution by law school (%)");
        println!(
            "{}",
            self.extended_time_distribution_by_law_school.term_table()
        );

        header("Extended time vs approval");
        println!("{}", self.extended_time_vs_approval.term_table());

        header("Correlations");
        println!("{}", self.extended_time_correlations.term_table());

        header("Correlation matrix");
        println!("{}", self.correlation_matrix.term_table());
    }
}

fn distributions(rows: &DerivedRequests, config: &ReportConfig) -> Result<Distributions> {
    let out = Distributions {
        request_types: value_counts(rows, Category::RequestType),
        extended_time_distribution: value_counts(rows, Category::ExtendedTime).sorted_by_label(),
        top_entries: top_k(rows, config.list_field, config.top_k)?,
        requests_by_law_school: value_counts(rows, Category::LawSchool),
        approval_distribution: value_counts(rows, Category::ApprovalStatus),
    };
    event!(Level::DEBUG, "distributions done");
    Ok(out)
}

fn groups(rows: &DerivedRequests, with_extended_time: &DerivedRequests) -> Groups {
    let out = Groups {
        extended_time_by_law_school: group_stats(
            with_extended_time,
            Category::LawSchool,
            Feature::ExtendedTime,
            Indicator::FullyApproved,
        ),
        approval_by_request_type: crosstab(rows, Category::RequestType, Category::ApprovalStatus),
        extended_time_distribution_by_law_school: crosstab(
            with_extended_time,
            Category::LawSchool,
            Category::ExtendedTime,
        ),
        extended_time_vs_approval: group_stats(
            with_extended_time,
            Category::LawSchool,
            Feature::ExtendedTime,
            Indicator::AnyApproved,
        ),
    };
    event!(Level::DEBUG, "group tables done");
    out
}
