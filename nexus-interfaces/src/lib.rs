//! Interface contracts for the Nexus campaign engine
//!
//! This crate defines the traits at the engine's two external seams: the
//! campaign store (an opaque document database with an atomic transaction
//! primitive) and the delivery channel (the messaging vendor). Keeping them
//! here lets the dispatch engine depend on contracts rather than concrete
//! implementations.

pub mod delivery;
pub mod store;

pub use delivery::{DeliveryChannel, DeliveryError};
pub use store::{CampaignStore, StoreError, StoreTransaction};
