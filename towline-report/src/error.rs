//! Report error types

use thiserror::Error;

/// Report result type
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors delivering a run outcome to a destination
#[derive(Error, Debug)]
pub enum ReportError {
    /// Filesystem error writing an artifact
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error building an artifact
    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}
