//! Driver error taxonomy

use std::time::Duration;
use thiserror::Error;

/// Driver result type
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors raised by a UI-automation driver
#[derive(Error, Debug)]
pub enum DriverError {
    /// Navigation to a URL failed
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// No element matched the selector
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A bounded wait elapsed before its condition was met
    #[error("Timed out after {waited:?} waiting for '{selector}'")]
    Timeout { selector: String, waited: Duration },

    /// The underlying session/page is gone or misbehaving
    #[error("Session error: {0}")]
    Session(String),
}

impl DriverError {
    /// Whether this error is a bounded-wait timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout { .. })
    }
}
