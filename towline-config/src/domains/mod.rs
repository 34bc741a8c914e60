//! Domain-specific configuration modules

pub mod logging;
pub mod output;
pub mod phases;
pub mod target;
pub mod utils;
pub mod workflow;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main Towline configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TowlineConfig {
    /// Target application configuration
    #[serde(default)]
    pub target: target::TargetConfig,

    /// Scheduled phase definitions
    #[serde(default)]
    pub phases: phases::PhasesConfig,

    /// Workflow step tuning
    #[serde(default)]
    pub workflow: workflow::WorkflowConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,

    /// Report output configuration
    #[serde(default)]
    pub output: output::OutputConfig,
}

impl TowlineConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.target.validate()?;
        self.phases.validate()?;
        self.workflow.validate()?;
        self.logging.validate()?;
        self.output.validate()?;

        Ok(())
    }

    /// Generate a sample configuration file as YAML
    pub fn generate_sample() -> String {
        let config = Self::default();
        serde_yaml::to_string(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TowlineConfig::default();
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_generate_sample_round_trips() {
        let sample = TowlineConfig::generate_sample();
        assert!(!sample.is_empty());

        let parsed: TowlineConfig = serde_yaml::from_str(&sample).unwrap();
        assert!(parsed.validate_all().is_ok());
    }
}
