//! Delivery channel interface
//!
//! The vendor boundary of the engine. A production implementation would wrap
//! a real SMS or email gateway; the engine only requires that a channel
//! accepts one rendered message and asynchronously reports an outcome.

use async_trait::async_trait;
use thiserror::Error;

use nexus_core::{DeliveryOutcome, RecipientJob};

/// Errors surfaced by a delivery channel
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// The vendor rejected the message
    #[error("vendor rejected message: {0}")]
    Rejected(String),

    /// The channel could not be reached
    #[error("channel unavailable: {0}")]
    Unavailable(String),
}

/// Outbound delivery channel for rendered campaign messages.
///
/// Implementations must never block the caller's other concurrent
/// invocations; each delivery is an independent asynchronous unit of work.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Deliver one rendered message to one recipient
    async fn deliver(&self, job: &RecipientJob) -> Result<DeliveryOutcome, DeliveryError>;
}
