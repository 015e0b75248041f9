//! Error types for campaign dispatch

use thiserror::Error;

use nexus_core::{CampaignId, LogId, ValidationError};
use nexus_interfaces::{DeliveryError, StoreError};

/// Campaign dispatch errors
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Campaign definition rejected before any state was created
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The campaign does not exist in the store
    #[error("Campaign not found: {0}")]
    CampaignNotFound(CampaignId),

    /// A receipt referenced a log that does not exist; dropped, not retried
    #[error("Communication log not found: {0}")]
    LogNotFound(LogId),

    /// Store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Delivery channel failure
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),
}
