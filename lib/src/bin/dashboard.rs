use clap::Parser;
use nta_accommodation_analysis::{
    default_snapshot_path, Config, ListField, MissingValues, Report, Requests, Session,
};
use qu::ick_use::*;
use std::{collections::BTreeSet, path::PathBuf};

/// Print the accommodation request dashboard.
#[derive(Parser)]
struct Opt {
    /// TOML config file.
    #[clap(long, short)]
    config: Option<PathBuf>,
    /// Requests to analyse: a snapshot, workbook or CSV export. Overrides the config.
    #[clap(long, short)]
    input: Option<PathBuf>,
    /// Only include these law schools (repeatable).
    #[clap(long)]
    law_school: Vec<String>,
    /// Only include these request types (repeatable).
    #[clap(long)]
    request_type: Vec<String>,
    /// Only include these approval statuses (repeatable).
    #[clap(long)]
    approval_status: Vec<String>,
    /// How many of the most common entries to show.
    #[clap(long, short = 'k')]
    top_k: Option<usize>,
    /// Rank `diagnoses` or `accommodations`.
    #[clap(long)]
    list_field: Option<ListField>,
    /// Correlate only over rows where both features are present, instead of reading missing
    /// values as zero.
    #[clap(long)]
    pairwise: bool,
    /// Print the report as JSON instead of tables.
    #[clap(long)]
    json: bool,
}

#[qu::ick]
pub fn main(opt: Opt) -> Result {
    let mut config = match &opt.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &opt);

    let input = opt
        .input
        .or(config.input.path)
        .unwrap_or_else(default_snapshot_path);
    let requests = Requests::load_orig(&input, config.input.sheet.as_deref())?;

    let mut session = Session::new(requests);
    let total = session.requests().len();
    let rows = session.derived(&config.selection);
    event!(
        Level::INFO,
        "{} of {} requests selected",
        rows.len(),
        total
    );
    let report = Report::build(rows, &config.report)?;

    if opt.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    Ok(())
}

fn apply_overrides(config: &mut Config, opt: &Opt) {
    let set = |values: &[String]| -> Option<BTreeSet<String>> {
        if values.is_empty() {
            None
        } else {
            Some(values.iter().cloned().collect())
        }
    };
    if let Some(law_schools) = set(&opt.law_school) {
        config.selection.law_schools = Some(law_schools);
    }
    if let Some(request_types) = set(&opt.request_type) {
        config.selection.request_types = Some(request_types);
    }
    if let Some(approval_statuses) = set(&opt.approval_status) {
        config.selection.approval_statuses = Some(approval_statuses);
    }
    if let Some(top_k) = opt.top_k {
        config.report.top_k = top_k;
    }
    if let Some(list_field) = opt.list_field {
        config.report.list_field = list_field;
    }
    if opt.pairwise {
        config.report.missing_values = MissingValues::PairwiseComplete;
    }
}
