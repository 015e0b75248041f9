//! Campaign store interfaces
//!
//! The store is the sole arbiter of persisted campaign state. It must
//! provide plain create/read operations plus one atomic transaction
//! primitive: a read-then-conditional-write over campaign and log documents
//! with compare-and-set semantics. Everything else in the engine synchronizes
//! only through that primitive.

use async_trait::async_trait;
use thiserror::Error;

use nexus_core::{Campaign, CampaignId, CommunicationLog, LogId};

/// Common store error type
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Create collided with an existing document
    #[error("duplicate {entity}: {id}")]
    DuplicateKey { entity: &'static str, id: String },

    /// Transaction aborted on contention and retries are exhausted
    #[error("transaction aborted after {attempts} attempts")]
    Conflict { attempts: u32 },

    /// Document could not be serialized or deserialized
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal store failure
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Shorthand for a missing campaign document
    pub fn campaign_not_found(id: &CampaignId) -> Self {
        StoreError::NotFound {
            entity: "campaign",
            id: id.to_string(),
        }
    }

    /// Shorthand for a missing communication log document
    pub fn log_not_found(id: &LogId) -> Self {
        StoreError::NotFound {
            entity: "communication log",
            id: id.to_string(),
        }
    }
}

/// Read-modify-write surface available inside one atomic transaction.
///
/// Reads are taken from an isolated snapshot and record the version of every
/// touched document; writes are buffered and committed conditionally on
/// those versions being unchanged. The store retries aborted transactions,
/// so the closure handed to [`CampaignStore::in_transaction`] may run more
/// than once and must confine its side effects to the transaction itself.
pub trait StoreTransaction {
    /// Read a campaign document
    fn get_campaign(&mut self, id: &CampaignId) -> Result<Option<Campaign>, StoreError>;

    /// Stage a campaign write
    fn put_campaign(&mut self, campaign: Campaign) -> Result<(), StoreError>;

    /// Read a communication log document
    fn get_log(&mut self, id: &LogId) -> Result<Option<CommunicationLog>, StoreError>;

    /// Stage a communication log write
    fn put_log(&mut self, log: CommunicationLog) -> Result<(), StoreError>;
}

/// Persistence contract for campaigns and their communication logs
#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Check that the store can serve requests
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Persist a new campaign; fails on an existing ID
    async fn create_campaign(&self, campaign: Campaign) -> Result<Campaign, StoreError>;

    /// Read a campaign by ID
    async fn get_campaign(&self, id: &CampaignId) -> Result<Option<Campaign>, StoreError>;

    /// List all campaigns, most recently created first
    async fn list_campaigns(&self) -> Result<Vec<Campaign>, StoreError>;

    /// Persist a new communication log entry; fails on an existing ID
    async fn create_log(&self, log: CommunicationLog) -> Result<CommunicationLog, StoreError>;

    /// Read a communication log entry by ID
    async fn get_log(&self, id: &LogId) -> Result<Option<CommunicationLog>, StoreError>;

    /// List log entries belonging to one campaign
    async fn list_logs_for_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<CommunicationLog>, StoreError>;

    /// Delete all log entries belonging to one campaign, returning how many
    /// were removed. Used to clear stale logs before a re-dispatch.
    async fn delete_logs_for_campaign(&self, campaign_id: &CampaignId) -> Result<u64, StoreError>;

    /// Run `operation` as one atomic, isolated transaction.
    ///
    /// The closure receives the transactional read-modify-write surface and
    /// may be invoked multiple times if the commit aborts on contention;
    /// results are communicated back through the closure's captures. The
    /// store owns retry policy — callers never retry themselves.
    async fn in_transaction(
        &self,
        operation: &mut (dyn for<'a> FnMut(&'a mut (dyn StoreTransaction + 'a)) -> Result<(), StoreError>
                 + Send),
    ) -> Result<(), StoreError>;
}
