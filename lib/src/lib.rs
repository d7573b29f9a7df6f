pub mod aggregate;
pub mod config;
pub mod correlate;
pub mod derive;
mod error;
pub mod feature;
pub mod filter;
pub mod frequency;
pub mod indicator;
pub mod parse;
pub mod report;
pub mod table;
mod util;

pub use anyhow::{Context, Error};
use calamine::{Reader, Xlsx};
use qu::ick_use::*;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs, io,
    ops::Deref,
    path::{Path, PathBuf},
    sync::Arc,
};

pub use crate::{
    aggregate::{crosstab, group_stats, value_counts},
    config::Config,
    correlate::{correlate, correlate_with, MissingValues},
    derive::{derive, DerivedRequest, DerivedRequests},
    error::ConfigError,
    feature::{Category, Feature, Label, ListField},
    filter::{Selection, Session},
    frequency::top_k,
    indicator::Indicator,
    report::{Report, ReportConfig},
    util::header,
};
use crate::util::{cell_text, optional_string};

pub type ArcStr = Arc<str>;
pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;

/// Column headers as they appear in the NTA key details workbook.
pub mod columns {
    pub const FILE_NAME: &str = "File_Name";
    pub const LAW_SCHOOL: &str = "Law_School";
    pub const REQUEST_TYPE: &str = "Request_Type";
    pub const APPROVAL_STATUS: &str = "Approved?";
    pub const REQUESTED_ACCOMMODATIONS: &str = "Requested_Accommodations";
    pub const DIAGNOSIS: &str = "Diagnosis";
    pub const NCBE_ID: &str = "NCBE_ID";
}

#[derive(Debug, Deserialize)]
struct RequestRaw {
    #[serde(rename = "File_Name", deserialize_with = "optional_string")]
    file_name: Option<ArcStr>,
    #[serde(rename = "Law_School", deserialize_with = "optional_string")]
    law_school: Option<ArcStr>,
    #[serde(rename = "Request_Type", deserialize_with = "optional_string")]
    request_type: Option<ArcStr>,
    #[serde(rename = "Approved?", deserialize_with = "optional_string")]
    approval_status: Option<ArcStr>,
    #[serde(
        rename = "Requested_Accommodations",
        deserialize_with = "optional_string"
    )]
    requested_accommodations: Option<ArcStr>,
    #[serde(rename = "Diagnosis", deserialize_with = "optional_string")]
    diagnosis: Option<ArcStr>,
    #[serde(rename = "NCBE_ID", default, deserialize_with = "optional_string")]
    ncbe_id: Option<ArcStr>,
}

/// A row in the accommodation requests dataset.
///
/// Every field may be missing on any row; the source spreadsheet is hand-maintained.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub file_name: Option<ArcStr>,
    pub law_school: Option<ArcStr>,
    /// e.g. "New Request", "Retake - Same Request", "Retake - Changed Request".
    pub request_type: Option<ArcStr>,
    /// e.g. "Appv.", "Appv. Part", "Prev. Exam".
    pub approval_status: Option<ArcStr>,
    /// Comma separated, may contain "50% Extended Time" style entries.
    pub requested_accommodations: Option<ArcStr>,
    /// Comma separated diagnosis labels.
    pub diagnosis: Option<ArcStr>,
    /// Contains a sequence number of the form `N1234`.
    pub ncbe_id: Option<ArcStr>,
}

impl From<RequestRaw> for Request {
    fn from(from: RequestRaw) -> Self {
        Self {
            file_name: from.file_name,
            law_school: from.law_school,
            request_type: from.request_type,
            approval_status: from.approval_status,
            requested_accommodations: from.requested_accommodations,
            diagnosis: from.diagnosis,
            ncbe_id: from.ncbe_id,
        }
    }
}

/// The loaded list of requests, in source order.
///
/// Cloning is cheap: the rows are shared.
#[derive(Debug, Clone, Default)]
pub struct Requests {
    els: Arc<Vec<Request>>,
}

impl Requests {
    /// Load requests from a workbook, a CSV export or a previously imported snapshot, choosing
    /// by file extension.
    pub fn load_orig(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("xlsx" | "xlsm") => Self::load_xlsx(path, sheet),
            Some("csv") => Self::load_csv(path),
            Some("bin") => Self::load(path),
            _ => bail!(
                "don't know how to read \"{}\" (expected .xlsx, .csv or .bin)",
                path.display()
            ),
        }
    }

    /// Read the requests worksheet of an Excel workbook.
    ///
    /// The first row must contain the column headers. If `sheet` is `None` the first worksheet
    /// is used.
    pub fn load_xlsx(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<Self> {
        fn inner(path: &Path, sheet: Option<&str>) -> Result<Requests> {
            let mut workbook: Xlsx<_> = calamine::open_workbook(path)?;
            let wksht = match sheet {
                Some(name) => workbook
                    .worksheet_range(name)
                    .with_context(|| format!("missing `{}` worksheet", name))??,
                None => workbook
                    .worksheet_range_at(0)
                    .context("workbook has no worksheets")??,
            };
            let mut rows = wksht.rows();
            let headers = rows.next().context("no data in workbook")?;
            let layout = ColumnLayout::from_headers(headers.iter().map(cell_text))?;
            let els: Vec<Request> = rows
                .map(|row| layout.request(|idx| row.get(idx).and_then(cell_text)))
                .collect();
            Ok(Requests::new(els))
        }

        let path = path.as_ref();
        let requests = inner(path, sheet)
            .with_context(|| format!("while loading workbook \"{}\"", path.display()))?;
        event!(
            Level::INFO,
            "loaded {} requests from \"{}\"",
            requests.len(),
            path.display()
        );
        Ok(requests)
    }

    /// Read requests from a CSV export of the workbook.
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let els: Vec<RequestRaw> = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?
            .into_deserialize()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("while loading \"{}\"", path.display()))?;
        let requests = Self::new(els.into_iter().map(Into::into).collect());
        event!(
            Level::INFO,
            "loaded {} requests from \"{}\"",
            requests.len(),
            path.display()
        );
        Ok(requests)
    }

    /// Load a snapshot written by `save`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load(path)?))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result {
        save(&self.els, path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Request> + '_ {
        self.els.iter()
    }

    /// Get a `Requests` object containing only requests that match the filter.
    pub fn filter(&self, f: impl Fn(&Request) -> bool) -> Self {
        Requests::new(self.iter().filter(|req| f(req)).cloned().collect())
    }

    fn new(els: Vec<Request>) -> Self {
        Requests { els: Arc::new(els) }
    }
}

impl Deref for Requests {
    type Target = [Request];
    fn deref(&self) -> &Self::Target {
        &self.els
    }
}

impl<'a> IntoIterator for &'a Requests {
    type IntoIter = <&'a [Request] as IntoIterator>::IntoIter;
    type Item = &'a Request;
    fn into_iter(self) -> Self::IntoIter {
        self.els.iter()
    }
}

impl FromIterator<Request> for Requests {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Request>,
    {
        Self::new(iter.into_iter().collect())
    }
}

/// Where each field lives in a worksheet.
struct ColumnLayout {
    file_name: usize,
    law_school: usize,
    request_type: usize,
    approval_status: usize,
    requested_accommodations: usize,
    diagnosis: usize,
    ncbe_id: Option<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: impl Iterator<Item = Option<ArcStr>>) -> Result<Self, ConfigError> {
        let headers: Vec<Option<ArcStr>> = headers.collect();
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|header| matches!(header, Some(h) if &**h == name))
        };
        let require = |name: &'static str| find(name).ok_or(ConfigError::MissingColumn(name));
        Ok(ColumnLayout {
            file_name: require(columns::FILE_NAME)?,
            law_school: require(columns::LAW_SCHOOL)?,
            request_type: require(columns::REQUEST_TYPE)?,
            approval_status: require(columns::APPROVAL_STATUS)?,
            requested_accommodations: require(columns::REQUESTED_ACCOMMODATIONS)?,
            diagnosis: require(columns::DIAGNOSIS)?,
            ncbe_id: find(columns::NCBE_ID),
        })
    }

    fn request(&self, cell: impl Fn(usize) -> Option<ArcStr>) -> Request {
        Request {
            file_name: cell(self.file_name),
            law_school: cell(self.law_school),
            request_type: cell(self.request_type),
            approval_status: cell(self.approval_status),
            requested_accommodations: cell(self.requested_accommodations),
            diagnosis: cell(self.diagnosis),
            ncbe_id: self.ncbe_id.and_then(&cell),
        }
    }
}

/// Load a snapshot into memory.
fn load<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    fn inner<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        let reader = io::BufReader::new(fs::File::open(path)?);
        bincode::deserialize_from(reader).map_err(Into::into)
    }
    let path = path.as_ref();
    check_extension(path, "bin")?;

    inner(path).with_context(|| format!("unable to load data from \"{}\"", path.display()))
}

/// Save a snapshot to disk.
fn save<T: Serialize>(contents: &[T], path: impl AsRef<Path>) -> Result {
    fn inner<T: Serialize>(contents: &[T], path: &Path) -> Result {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("could not create parent")?;
        }
        if util::path_exists(path)? {
            event!(
                Level::WARN,
                "overwriting existing file at \"{}\"",
                path.display()
            );
        }
        let mut out = io::BufWriter::new(fs::File::create(path)?);
        bincode::serialize_into(&mut out, contents)?;
        Ok(())
    }
    let path = path.as_ref();
    check_extension(path, "bin")?;

    inner(contents, path).with_context(|| format!("unable to save data to \"{}\"", path.display()))
}

pub fn check_extension(path: &Path, ext: &str) -> Result<()> {
    ensure!(
        matches!(path.extension(), Some(p) if p == ext),
        "filename should end with `.{}`",
        ext
    );
    Ok(())
}

/// The default location of the imported snapshot.
pub fn default_snapshot_path() -> PathBuf {
    PathBuf::from("requests.bin")
}

#[cfg(test)]
mod test {
    use super::*;

    fn headers(names: &[&str]) -> impl Iterator<Item = Option<ArcStr>> {
        names
            .iter()
            .map(|name| Some(ArcStr::from(*name)))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn layout_finds_columns_in_any_order() {
        let layout = ColumnLayout::from_headers(headers(&[
            "Diagnosis",
            "Approved?",
            "File_Name",
            "Law_School",
            "Requested_Accommodations",
            "Request_Type",
        ]))
        .unwrap();
        let row = ["ADHD", "Appv.", "f1.pdf", "Yale", "Laptop", "New Request"];
        let req = layout.request(|idx| row.get(idx).map(|s| ArcStr::from(*s)));
        assert_eq!(req.file_name.as_deref(), Some("f1.pdf"));
        assert_eq!(req.law_school.as_deref(), Some("Yale"));
        assert_eq!(req.approval_status.as_deref(), Some("Appv."));
        assert_eq!(req.diagnosis.as_deref(), Some("ADHD"));
        assert_eq!(req.ncbe_id, None);
    }

    #[test]
    fn layout_rejects_missing_required_column() {
        let err = ColumnLayout::from_headers(headers(&["File_Name", "Law_School"]))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::MissingColumn("Request_Type")));
    }

    #[test]
    fn filter_is_a_view() {
        let requests: Requests = vec![
            Request {
                law_school: Some("Yale".into()),
                ..Default::default()
            },
            Request {
                law_school: Some("Duke".into()),
                ..Default::default()
            },
        ]
        .into_iter()
        .collect();
        let yale = requests.filter(|req| req.law_school.as_deref() == Some("Yale"));
        assert_eq!(yale.len(), 1);
        assert_eq!(requests.len(), 2);
    }

    #[test]
    fn snapshot_needs_bin_extension() {
        assert!(check_extension(Path::new("requests.bin"), "bin").is_ok());
        assert!(check_extension(Path::new("requests.csv"), "bin").is_err());
    }
}
