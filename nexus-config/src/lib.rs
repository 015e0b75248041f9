//! Domain-driven configuration management for the Nexus campaign engine
//!
//! Configuration is split by functional domain, with serde defaults,
//! per-domain validation, and a YAML loader with environment variable
//! overrides.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    delivery::DeliveryConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    storage::StorageConfig,
    NexusConfig,
};
