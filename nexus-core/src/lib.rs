//! Core domain model for the Nexus campaign engine
//!
//! This crate holds the pure, storage-agnostic parts of campaign dispatch:
//! entity definitions, the campaign aggregate state machine, message template
//! rendering, and audience expansion. Everything here is synchronous and
//! side-effect free; persistence and concurrency live in the sibling crates.

pub mod campaign;
pub mod error;
pub mod identifiers;
pub mod log;
pub mod recipients;
pub mod template;

// Re-export core types for convenience
pub use campaign::{Campaign, CampaignDefinition, CampaignStatus};
pub use error::ValidationError;
pub use identifiers::{CampaignId, LogId};
pub use log::{CommunicationLog, DeliveryOutcome, LogStatus};
pub use recipients::{expand_recipients, RecipientJob};
