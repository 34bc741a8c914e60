//! Workflow step tuning

use crate::error::ConfigResult;
use crate::validation::{validate_nonzero_duration, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Workflow step tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Pause after the work-queue view loads, letting asynchronous
    /// status images settle before the completion scan
    #[serde(with = "crate::domains::utils::serde_duration", default = "default_settle_after_queue_view")]
    pub settle_after_queue_view: Duration,

    /// Bound on the wait for the nearest-resource result panel
    #[serde(with = "crate::domains::utils::serde_duration", default = "default_resource_lookup_timeout")]
    pub resource_lookup_timeout: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            settle_after_queue_view: default_settle_after_queue_view(),
            resource_lookup_timeout: default_resource_lookup_timeout(),
        }
    }
}

impl Validatable for WorkflowConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_nonzero_duration(
            self.resource_lookup_timeout,
            "resource_lookup_timeout",
            self.domain_name(),
        )?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "workflow"
    }
}

// Default value functions
fn default_settle_after_queue_view() -> Duration {
    Duration::from_secs(3)
}

fn default_resource_lookup_timeout() -> Duration {
    Duration::from_secs(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_defaults() {
        let config = WorkflowConfig::default();
        assert_eq!(config.settle_after_queue_view, Duration::from_secs(3));
        assert_eq!(config.resource_lookup_timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_lookup_timeout_rejected() {
        let config = WorkflowConfig {
            resource_lookup_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
