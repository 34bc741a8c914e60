//! Logging configuration

use crate::error::ConfigResult;
use crate::validation::{validate_enum_choice, Validatable};
use serde::{Deserialize, Serialize};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_level")]
    pub level: String,

    /// Include tracing span targets in output
    #[serde(default)]
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            with_target: false,
        }
    }
}

impl Validatable for LoggingConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_enum_choice(
            &self.level,
            &["trace", "debug", "info", "warn", "error"],
            "level",
            self.domain_name(),
        )?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "logging"
    }
}

fn default_level() -> String {
    "info".to_string()
}
