use clap::Parser;
use nta_accommodation_analysis::{default_snapshot_path, Requests};
use qu::ick_use::*;
use std::path::PathBuf;

/// Import the requests workbook (or a CSV export of it) into a snapshot for the dashboard.
#[derive(Parser)]
struct Opt {
    /// The `.xlsx` workbook or `.csv` export to read.
    input: PathBuf,
    /// Worksheet to read, if not the first.
    #[clap(long, short)]
    sheet: Option<String>,
    /// Where to write the snapshot (default `requests.bin`).
    #[clap(long, short)]
    output: Option<PathBuf>,
}

#[qu::ick]
pub fn main(opt: Opt) -> Result {
    let requests = Requests::load_orig(&opt.input, opt.sheet.as_deref())?;
    let output = opt.output.unwrap_or_else(default_snapshot_path);
    requests.save(&output)?;
    event!(
        Level::INFO,
        "wrote {} requests to \"{}\"",
        requests.len(),
        output.display()
    );
    Ok(())
}
