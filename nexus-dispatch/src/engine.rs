//! Engine assembly from configuration
//!
//! Wires the store, simulated delivery channel, and dispatcher together
//! from a validated [`NexusConfig`].

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use nexus_config::{ConfigResult, LogFormat, LogLevel, LoggingConfig, NexusConfig};
use nexus_core::{CampaignDefinition, CampaignId};
use nexus_interfaces::CampaignStore;
use nexus_storage::{InMemoryStore, RetryPolicy};

use crate::dispatcher::CampaignDispatcher;
use crate::error::DispatchError;
use crate::receipt::DeliveryReceiptHandler;
use crate::simulator::SimulatedChannel;

/// Fully assembled campaign engine.
///
/// Owns the store and the dispatcher; callers interact through it rather
/// than wiring the pieces by hand.
pub struct CampaignEngine {
    config: NexusConfig,
    store: Arc<InMemoryStore>,
    dispatcher: CampaignDispatcher,
}

impl CampaignEngine {
    /// Assemble an engine from a validated configuration.
    ///
    /// Rejects the configuration up front so a misconfigured engine never
    /// starts dispatching.
    pub fn from_config(config: NexusConfig) -> ConfigResult<Self> {
        config.validate_all()?;

        let retry = RetryPolicy {
            max_retries: config.storage.max_retries,
            base_delay: Duration::from_millis(config.storage.base_delay_ms),
            max_delay: Duration::from_millis(config.storage.max_delay_ms),
            jitter: config.storage.jitter,
        };
        let store = Arc::new(InMemoryStore::with_retry_policy(retry));
        let channel = Arc::new(SimulatedChannel::new(config.delivery.clone()));
        let dispatcher = CampaignDispatcher::new(
            Arc::clone(&store) as Arc<dyn CampaignStore>,
            channel,
        );

        info!(
            success_rate = config.delivery.success_rate,
            min_latency_ms = config.delivery.min_latency_ms,
            max_latency_ms = config.delivery.max_latency_ms,
            "campaign engine assembled"
        );
        Ok(Self {
            config,
            store,
            dispatcher,
        })
    }

    /// Assemble an engine with built-in defaults
    pub fn with_defaults() -> ConfigResult<Self> {
        Self::from_config(NexusConfig::default())
    }

    /// Install a global tracing subscriber per the logging configuration.
    ///
    /// Call once at process startup; later calls are ignored if a
    /// subscriber is already installed.
    pub fn init_logging(config: &LoggingConfig) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level_directive(config)));
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let result = match config.format {
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Text => builder.try_init(),
        };
        if result.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    }

    /// The effective configuration this engine runs with
    pub fn config(&self) -> &NexusConfig {
        &self.config
    }

    /// The store backing this engine
    pub fn store(&self) -> Arc<dyn CampaignStore> {
        Arc::clone(&self.store) as Arc<dyn CampaignStore>
    }

    /// The receipt handler, for reporting delivery outcomes directly
    pub fn receipt_handler(&self) -> Arc<DeliveryReceiptHandler> {
        self.dispatcher.receipt_handler()
    }

    /// Validate, create, and dispatch a new campaign
    pub async fn start_campaign(
        &self,
        definition: CampaignDefinition,
    ) -> Result<CampaignId, DispatchError> {
        self.dispatcher.start_campaign(definition).await
    }

    /// Re-dispatch an existing campaign under a fresh generation
    pub async fn dispatch(&self, campaign_id: &CampaignId) -> Result<(), DispatchError> {
        self.dispatcher.dispatch(campaign_id).await
    }
}

fn level_directive(config: &LoggingConfig) -> &'static str {
    match config.level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
