//! Target application configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// Target application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL of the application under load
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Substring identifying a production deployment URL
    #[serde(default = "default_production_url_marker")]
    pub production_url_marker: String,

    /// Size of the rotating operator credential pool per phase
    #[serde(default = "default_credential_pool_size")]
    pub credential_pool_size: u64,

    /// Password shared by the pooled operator accounts
    #[serde(default = "default_password")]
    pub password: String,
}

impl TargetConfig {
    /// Whether the configured target is a production deployment
    pub fn is_production(&self) -> bool {
        self.base_url.contains(&self.production_url_marker)
    }

    /// Build an absolute URL for a path on the target
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            production_url_marker: default_production_url_marker(),
            credential_pool_size: default_credential_pool_size(),
            password: default_password(),
        }
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.base_url, "base_url", self.domain_name())?;
        validate_required_string(&self.production_url_marker, "production_url_marker", self.domain_name())?;
        validate_required_string(&self.password, "password", self.domain_name())?;
        validate_positive(self.credential_pool_size, "credential_pool_size", self.domain_name())?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_production_url_marker() -> String {
    "https://app-".to_string()
}

fn default_credential_pool_size() -> u64 {
    10
}

fn default_password() -> String {
    "password".to_string()
}
