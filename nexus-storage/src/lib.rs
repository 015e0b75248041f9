//! In-memory campaign store
//!
//! Implements the [`nexus_interfaces::CampaignStore`] contract over
//! process-local maps with document versioning and optimistic transactions.
//! Persistence is an opaque document store with one atomic read-modify-write
//! primitive; this crate is that store for tests and single-process
//! deployments, and the shape a real database adapter would take.

pub mod memory;

pub use memory::{InMemoryStore, RetryPolicy};
