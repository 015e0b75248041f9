//! Store transaction retry configuration

use crate::error::ConfigResult;
use crate::validation::{validate_non_zero, Validatable};
use serde::{Deserialize, Serialize};

/// Configuration for the store's optimistic transaction retries.
///
/// Contention on the campaign record is retried inside the store; these
/// knobs bound that retry loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// How many times an aborted transaction is re-run before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff before the first retry, in milliseconds; doubles per retry
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound on the backoff delay, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Whether to add random jitter to retry delays
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: default_jitter(),
        }
    }
}

impl Validatable for StorageConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_non_zero(self.base_delay_ms, "base_delay_ms", self.domain_name())?;
        validate_non_zero(self.max_delay_ms, "max_delay_ms", self.domain_name())?;
        if self.base_delay_ms > self.max_delay_ms {
            return Err(self.validation_error(format!(
                "base_delay_ms ({}) must not exceed max_delay_ms ({})",
                self.base_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "storage"
    }
}

fn default_max_retries() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    10
}

fn default_max_delay_ms() -> u64 {
    250
}

fn default_jitter() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.base_delay_ms, 10);
        assert_eq!(config.max_delay_ms, 250);
        assert!(config.jitter);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_storage_config_rejects_inverted_delays() {
        let config = StorageConfig {
            base_delay_ms: 500,
            max_delay_ms: 100,
            ..StorageConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_config_rejects_zero_delay() {
        let config = StorageConfig {
            base_delay_ms: 0,
            ..StorageConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
