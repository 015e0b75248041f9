//! Delivery channel configuration

use crate::error::ConfigResult;
use crate::validation::{validate_non_zero, validate_probability, Validatable};
use serde::{Deserialize, Serialize};

/// Configuration for the simulated delivery channel.
///
/// Latency bounds model vendor round-trip time; they are tunables, not
/// correctness properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Lower bound of the simulated vendor latency, in milliseconds
    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: u64,

    /// Upper bound of the simulated vendor latency, in milliseconds
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,

    /// Probability that a delivery succeeds
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: default_min_latency_ms(),
            max_latency_ms: default_max_latency_ms(),
            success_rate: default_success_rate(),
        }
    }
}

impl Validatable for DeliveryConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_non_zero(self.max_latency_ms, "max_latency_ms", self.domain_name())?;
        if self.min_latency_ms > self.max_latency_ms {
            return Err(self.validation_error(format!(
                "min_latency_ms ({}) must not exceed max_latency_ms ({})",
                self.min_latency_ms, self.max_latency_ms
            )));
        }
        validate_probability(self.success_rate, "success_rate", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "delivery"
    }
}

fn default_min_latency_ms() -> u64 {
    50
}

fn default_max_latency_ms() -> u64 {
    200
}

fn default_success_rate() -> f64 {
    0.9
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_config_defaults() {
        let config = DeliveryConfig::default();
        assert_eq!(config.min_latency_ms, 50);
        assert_eq!(config.max_latency_ms, 200);
        assert_eq!(config.success_rate, 0.9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_delivery_config_rejects_inverted_latency_bounds() {
        let config = DeliveryConfig {
            min_latency_ms: 300,
            max_latency_ms: 200,
            ..DeliveryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_delivery_config_rejects_bad_success_rate() {
        let config = DeliveryConfig {
            success_rate: 1.5,
            ..DeliveryConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
