//! Configuration loading and environment variable handling

use crate::domains::NexusConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with the default prefix
    pub fn new() -> Self {
        Self {
            prefix: "NEXUS".to_string(),
        }
    }

    /// Create a new config loader with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<NexusConfig> {
        let content = std::fs::read_to_string(path)?;
        self.from_yaml(&content)
    }

    /// Load configuration from a YAML string with environment overrides
    pub fn from_yaml(&self, content: &str) -> ConfigResult<NexusConfig> {
        let mut config: NexusConfig = serde_yaml::from_str(content)?;
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<NexusConfig> {
        let mut config = NexusConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<NexusConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut NexusConfig) -> ConfigResult<()> {
        if let Some(value) = self.parse_env::<f64>("DELIVERY_SUCCESS_RATE")? {
            config.delivery.success_rate = value;
        }
        if let Some(value) = self.parse_env::<u64>("DELIVERY_MIN_LATENCY_MS")? {
            config.delivery.min_latency_ms = value;
        }
        if let Some(value) = self.parse_env::<u64>("DELIVERY_MAX_LATENCY_MS")? {
            config.delivery.max_latency_ms = value;
        }
        if let Some(value) = self.parse_env::<u32>("STORAGE_MAX_RETRIES")? {
            config.storage.max_retries = value;
        }
        if let Ok(value) = std::env::var(self.env_name("LOG_LEVEL")) {
            config.logging.level = value
                .parse()
                .map_err(|e: String| ConfigError::EnvError(e))?;
        }
        Ok(())
    }

    fn env_name(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key)
    }

    fn parse_env<T: FromStr>(&self, key: &str) -> ConfigResult<Option<T>>
    where
        T::Err: std::fmt::Display,
    {
        match std::env::var(self.env_name(key)) {
            Ok(value) => value.parse::<T>().map(Some).map_err(|e| {
                ConfigError::EnvError(format!("invalid {}: {}", self.env_name(key), e))
            }),
            Err(_) => Ok(None),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
