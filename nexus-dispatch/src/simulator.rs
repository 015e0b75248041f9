//! Simulated delivery channel
//!
//! Stands in for the real messaging vendor: each delivery waits a random
//! bounded latency, then succeeds with a configured probability. A
//! production channel would replace this implementation while preserving the
//! [`DeliveryChannel`] interface.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::time::sleep;
use tracing::debug;

use nexus_config::DeliveryConfig;
use nexus_core::{DeliveryOutcome, RecipientJob};
use nexus_interfaces::{DeliveryChannel, DeliveryError};

/// Vendor simulation with uniform random latency and Bernoulli outcomes
#[derive(Debug)]
pub struct SimulatedChannel {
    config: DeliveryConfig,
}

impl SimulatedChannel {
    /// Create a channel from delivery configuration
    pub fn new(config: DeliveryConfig) -> Self {
        Self { config }
    }

    fn sample_latency(&self) -> Duration {
        let min = self.config.min_latency_ms.min(self.config.max_latency_ms);
        let max = self.config.max_latency_ms.max(self.config.min_latency_ms);
        let millis = if min == max {
            min
        } else {
            rand::rng().random_range(min..=max)
        };
        Duration::from_millis(millis)
    }
}

#[async_trait]
impl DeliveryChannel for SimulatedChannel {
    async fn deliver(&self, job: &RecipientJob) -> Result<DeliveryOutcome, DeliveryError> {
        sleep(self.sample_latency()).await;

        let success = rand::rng().random_bool(self.config.success_rate.clamp(0.0, 1.0));
        let outcome = if success {
            DeliveryOutcome::Sent
        } else {
            DeliveryOutcome::Failed
        };
        debug!(customer_id = %job.customer_id, ?outcome, "simulated delivery");
        Ok(outcome)
    }
}
