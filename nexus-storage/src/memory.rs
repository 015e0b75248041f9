//! In-memory document store with optimistic transactions
//!
//! Documents are kept in `RwLock`-protected maps, each carrying a version
//! counter. A transaction runs its closure against a read snapshot, records
//! the version of every document it reads, and buffers its writes; the
//! commit re-checks those versions under the write lock and aborts if any
//! changed (compare-and-set). Aborted transactions are retried here, with
//! bounded exponential backoff, so callers never see transient contention.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use nexus_core::{Campaign, CampaignId, CommunicationLog, LogId};
use nexus_interfaces::{CampaignStore, StoreError, StoreTransaction};

/// Retry policy for transactions aborted on contention
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// How many times an aborted transaction is re-run before giving up
    pub max_retries: u32,

    /// Backoff before the first retry; doubles on each subsequent retry
    pub base_delay: Duration,

    /// Upper bound on the backoff delay
    pub max_delay: Duration,

    /// Whether to add random jitter to each delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(250),
            jitter: true,
        }
    }
}

/// A document plus its commit version
#[derive(Debug, Clone)]
struct Versioned<T> {
    version: u64,
    document: T,
}

#[derive(Debug, Default)]
struct StoreState {
    campaigns: HashMap<CampaignId, Versioned<Campaign>>,
    logs: HashMap<LogId, Versioned<CommunicationLog>>,
}

/// Process-local implementation of [`CampaignStore`]
#[derive(Debug)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    retry: RetryPolicy,
}

impl InMemoryStore {
    /// Create an empty store with the default retry policy
    pub fn new() -> Self {
        Self::with_retry_policy(RetryPolicy::default())
    }

    /// Create an empty store with an explicit retry policy
    pub fn with_retry_policy(retry: RetryPolicy) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            retry,
        }
    }

    fn read_state(&self) -> Result<std::sync::RwLockReadGuard<'_, StoreState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Internal("store lock poisoned".to_string()))
    }

    fn write_state(&self) -> Result<std::sync::RwLockWriteGuard<'_, StoreState>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Internal("store lock poisoned".to_string()))
    }

    /// Backoff before retry number `attempt` (1-based)
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponential = self
            .retry
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
        let mut delay = exponential.min(self.retry.max_delay);
        if self.retry.jitter {
            let half = (delay.as_millis() as u64 / 2).max(1);
            delay += Duration::from_millis(rand::rng().random_range(0..half));
        }
        delay.min(self.retry.max_delay)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Version observed for a read document; absent documents read as version 0
const ABSENT: u64 = 0;

/// One transaction attempt: snapshot reads plus buffered writes
struct MemoryTransaction<'a> {
    state: &'a StoreState,
    campaign_reads: HashMap<CampaignId, u64>,
    log_reads: HashMap<LogId, u64>,
    campaign_writes: HashMap<CampaignId, Campaign>,
    log_writes: HashMap<LogId, CommunicationLog>,
}

impl<'a> MemoryTransaction<'a> {
    fn new(state: &'a StoreState) -> Self {
        Self {
            state,
            campaign_reads: HashMap::new(),
            log_reads: HashMap::new(),
            campaign_writes: HashMap::new(),
            log_writes: HashMap::new(),
        }
    }
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn get_campaign(&mut self, id: &CampaignId) -> Result<Option<Campaign>, StoreError> {
        // Read-your-writes within the transaction
        if let Some(staged) = self.campaign_writes.get(id) {
            return Ok(Some(staged.clone()));
        }
        let entry = self.state.campaigns.get(id);
        self.campaign_reads
            .entry(*id)
            .or_insert_with(|| entry.map_or(ABSENT, |v| v.version));
        Ok(entry.map(|v| v.document.clone()))
    }

    fn put_campaign(&mut self, campaign: Campaign) -> Result<(), StoreError> {
        self.campaign_writes.insert(campaign.id, campaign);
        Ok(())
    }

    fn get_log(&mut self, id: &LogId) -> Result<Option<CommunicationLog>, StoreError> {
        if let Some(staged) = self.log_writes.get(id) {
            return Ok(Some(staged.clone()));
        }
        let entry = self.state.logs.get(id);
        self.log_reads
            .entry(*id)
            .or_insert_with(|| entry.map_or(ABSENT, |v| v.version));
        Ok(entry.map(|v| v.document.clone()))
    }

    fn put_log(&mut self, log: CommunicationLog) -> Result<(), StoreError> {
        self.log_writes.insert(log.id, log);
        Ok(())
    }
}

/// Read set and write set carried from a transaction attempt into its commit
struct TransactionOutcome {
    campaign_reads: HashMap<CampaignId, u64>,
    log_reads: HashMap<LogId, u64>,
    campaign_writes: HashMap<CampaignId, Campaign>,
    log_writes: HashMap<LogId, CommunicationLog>,
}

impl StoreState {
    /// Whether every document read by the transaction is still at the
    /// version it was read at
    fn read_set_unchanged(&self, outcome: &TransactionOutcome) -> bool {
        let campaigns_ok = outcome.campaign_reads.iter().all(|(id, version)| {
            self.campaigns.get(id).map_or(ABSENT, |v| v.version) == *version
        });
        let logs_ok = outcome
            .log_reads
            .iter()
            .all(|(id, version)| self.logs.get(id).map_or(ABSENT, |v| v.version) == *version);
        campaigns_ok && logs_ok
    }

    /// Apply buffered writes, bumping each document's version
    fn apply(&mut self, outcome: TransactionOutcome) {
        for (id, document) in outcome.campaign_writes {
            let version = self.campaigns.get(&id).map_or(ABSENT, |v| v.version) + 1;
            self.campaigns.insert(id, Versioned { version, document });
        }
        for (id, document) in outcome.log_writes {
            let version = self.logs.get(&id).map_or(ABSENT, |v| v.version) + 1;
            self.logs.insert(id, Versioned { version, document });
        }
    }
}

#[async_trait]
impl CampaignStore for InMemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        self.read_state().map(|_| ())
    }

    async fn create_campaign(&self, campaign: Campaign) -> Result<Campaign, StoreError> {
        let mut state = self.write_state()?;
        if state.campaigns.contains_key(&campaign.id) {
            return Err(StoreError::DuplicateKey {
                entity: "campaign",
                id: campaign.id.to_string(),
            });
        }
        state.campaigns.insert(
            campaign.id,
            Versioned {
                version: 1,
                document: campaign.clone(),
            },
        );
        Ok(campaign)
    }

    async fn get_campaign(&self, id: &CampaignId) -> Result<Option<Campaign>, StoreError> {
        let state = self.read_state()?;
        Ok(state.campaigns.get(id).map(|v| v.document.clone()))
    }

    async fn list_campaigns(&self) -> Result<Vec<Campaign>, StoreError> {
        let state = self.read_state()?;
        let mut campaigns: Vec<Campaign> =
            state.campaigns.values().map(|v| v.document.clone()).collect();
        // Dashboard ordering: newest first, ID as a deterministic tie-break
        campaigns.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
        });
        Ok(campaigns)
    }

    async fn create_log(&self, log: CommunicationLog) -> Result<CommunicationLog, StoreError> {
        let mut state = self.write_state()?;
        if state.logs.contains_key(&log.id) {
            return Err(StoreError::DuplicateKey {
                entity: "communication log",
                id: log.id.to_string(),
            });
        }
        state.logs.insert(
            log.id,
            Versioned {
                version: 1,
                document: log.clone(),
            },
        );
        Ok(log)
    }

    async fn get_log(&self, id: &LogId) -> Result<Option<CommunicationLog>, StoreError> {
        let state = self.read_state()?;
        Ok(state.logs.get(id).map(|v| v.document.clone()))
    }

    async fn list_logs_for_campaign(
        &self,
        campaign_id: &CampaignId,
    ) -> Result<Vec<CommunicationLog>, StoreError> {
        let state = self.read_state()?;
        let mut logs: Vec<CommunicationLog> = state
            .logs
            .values()
            .filter(|v| v.document.campaign_id == *campaign_id)
            .map(|v| v.document.clone())
            .collect();
        logs.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.customer_id.cmp(&b.customer_id))
        });
        Ok(logs)
    }

    async fn delete_logs_for_campaign(&self, campaign_id: &CampaignId) -> Result<u64, StoreError> {
        let mut state = self.write_state()?;
        let before = state.logs.len();
        state
            .logs
            .retain(|_, v| v.document.campaign_id != *campaign_id);
        Ok((before - state.logs.len()) as u64)
    }

    async fn in_transaction(
        &self,
        operation: &mut (dyn for<'a> FnMut(&'a mut (dyn StoreTransaction + 'a)) -> Result<(), StoreError>
                 + Send),
    ) -> Result<(), StoreError> {
        let mut attempts = 0;
        loop {
            attempts += 1;

            // Run the closure against a read snapshot; guard dropped before
            // any await point.
            let outcome = {
                let state = self.read_state()?;
                let mut tx = MemoryTransaction::new(&state);
                operation(&mut tx)?;
                TransactionOutcome {
                    campaign_reads: tx.campaign_reads,
                    log_reads: tx.log_reads,
                    campaign_writes: tx.campaign_writes,
                    log_writes: tx.log_writes,
                }
            };

            {
                let mut state = self.write_state()?;
                if state.read_set_unchanged(&outcome) {
                    state.apply(outcome);
                    if attempts > 1 {
                        debug!(attempts, "transaction committed after retry");
                    }
                    return Ok(());
                }
            }

            if attempts > self.retry.max_retries {
                warn!(attempts, "transaction retries exhausted");
                return Err(StoreError::Conflict { attempts });
            }

            let delay = self.backoff_delay(attempts);
            debug!(attempts, delay_ms = delay.as_millis() as u64, "transaction conflicted, retrying");
            sleep(delay).await;
        }
    }
}
