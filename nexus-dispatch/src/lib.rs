//! Campaign dispatch engine
//!
//! Expands an audience into per-recipient send jobs, fans them out as
//! independent asynchronous tasks through a delivery channel, and folds the
//! resulting delivery receipts into an idempotent, race-free campaign status
//! via the store's transaction primitive.
//!
//! The dispatcher is fire-and-forget: it returns once jobs are spawned, and
//! completion is observed by polling the campaign record. The receipt
//! handler is the single place where counters and status transition.

pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod receipt;
pub mod simulator;

pub use dispatcher::CampaignDispatcher;
pub use engine::CampaignEngine;
pub use error::DispatchError;
pub use receipt::{DeliveryReceipt, DeliveryReceiptHandler, ReceiptDisposition};
pub use simulator::SimulatedChannel;
