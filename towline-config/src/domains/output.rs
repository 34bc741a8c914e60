//! Report output configuration

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the JSON run artifact
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,

    /// Pretty-print the JSON artifact
    #[serde(default = "crate::domains::utils::default_true")]
    pub pretty: bool,

    /// Print the human-readable summary to stdout
    #[serde(default = "crate::domains::utils::default_true")]
    pub console_summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            pretty: true,
            console_summary: true,
        }
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> ConfigResult<()> {
        let path = self.artifact_path.to_string_lossy();
        validate_required_string(&path, "artifact_path", self.domain_name())?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "output"
    }
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from("towline-summary.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_artifact_path_rejected() {
        let config = OutputConfig {
            artifact_path: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
