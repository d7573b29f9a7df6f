/// Mistakes in how the pipeline was asked to run.
///
/// These are programming or configuration errors and are always fatal. Dirty data never
/// produces one of these.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown feature `{0}`")]
    UnknownFeature(String),
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
    #[error("unknown list field `{0}`")]
    UnknownListField(String),
    #[error("unknown indicator `{0}`")]
    UnknownIndicator(String),
    #[error("input has no `{0}` column")]
    MissingColumn(&'static str),
    #[error("top-k needs k >= 1")]
    InvalidTopK,
    #[error("at least one feature is needed to compute correlations")]
    NoFeatures,
}
