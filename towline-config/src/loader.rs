//! Configuration loading and environment variable handling

use crate::domains::TowlineConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use tracing::debug;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "TOWLINE".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<TowlineConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: TowlineConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<TowlineConfig> {
        let mut config = TowlineConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<TowlineConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut TowlineConfig) -> ConfigResult<()> {
        if let Ok(base_url) = self.get_env_var("BASE_URL") {
            debug!("Overriding target.base_url from environment");
            config.target.base_url = base_url;
        }

        if let Ok(pool_size) = self.get_env_var("CREDENTIAL_POOL_SIZE") {
            config.target.credential_pool_size = pool_size.parse().map_err(|e| {
                ConfigError::EnvError(format!("Invalid {}_CREDENTIAL_POOL_SIZE: {}", self.prefix, e))
            })?;
        }

        if let Ok(path) = self.get_env_var("ARTIFACT_PATH") {
            config.output.artifact_path = path.into();
        }

        if let Ok(level) = self.get_env_var("LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }

    /// Read a prefixed environment variable
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
