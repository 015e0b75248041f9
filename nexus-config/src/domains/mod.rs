//! Domain-specific configuration modules

pub mod delivery;
pub mod logging;
pub mod storage;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main engine configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NexusConfig {
    /// Delivery channel simulation configuration
    #[serde(default)]
    pub delivery: delivery::DeliveryConfig,

    /// Store transaction retry configuration
    #[serde(default)]
    pub storage: storage::StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl NexusConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.delivery.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(NexusConfig::default().validate_all().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: NexusConfig =
            serde_yaml::from_str("delivery:\n  success_rate: 0.5\n").unwrap();
        assert_eq!(config.delivery.success_rate, 0.5);
        assert_eq!(config.delivery.min_latency_ms, 50);
        assert_eq!(config.storage.max_retries, 5);
    }
}
