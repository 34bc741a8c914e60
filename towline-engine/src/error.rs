//! Engine error types

use thiserror::Error;

/// Engine result type
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that abort a run.
///
/// Step and iteration failures never surface here; they are contained at
/// the iteration boundary and visible only as undercounting in the metric
/// registry.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid configuration, detected before any phase starts
    #[error("Configuration error: {0}")]
    Configuration(#[from] towline_config::ConfigError),

    /// A phase supervision task failed outright (e.g. panicked)
    #[error("Phase task failed: {0}")]
    PhaseTask(String),
}
