use thiserror::Error;

/// Errors surfaced by report assembly and the call stores.
///
/// Events that reference an unknown location, call type or purpose are not
/// errors: they are dropped during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Malformed or inverted date bounds.
    #[error("invalid date range: {0}")]
    InvalidRange(String),

    /// An axis that must be non-empty came out empty.
    #[error("report axis `{axis}` must not be empty")]
    EmptyAxis { axis: &'static str },

    #[error("missing required parameter `{0}`")]
    MissingRequiredParameter(&'static str),

    /// Data-access failure in a call store.
    #[error("call store error: {0}")]
    Store(String),
}

impl From<rusqlite::Error> for ReportError {
    fn from(err: rusqlite::Error) -> Self {
        ReportError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Store(err.to_string())
    }
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
