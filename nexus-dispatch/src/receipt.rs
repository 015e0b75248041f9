//! Delivery receipt handling
//!
//! The transactional core of the engine. Every receipt is applied in a
//! single atomic transaction that moves the communication log to its
//! terminal state and folds the outcome into the owning campaign's
//! aggregate. Duplicate and replayed receipts are expected under
//! at-least-once delivery semantics and must leave the campaign untouched;
//! receipts from a superseded dispatch generation are likewise inert.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, warn};

use nexus_core::{CampaignId, DeliveryOutcome, LogId};
use nexus_interfaces::CampaignStore;

use crate::error::DispatchError;

/// Asynchronous report of one recipient's delivery outcome
#[derive(Debug, Clone, Copy)]
pub struct DeliveryReceipt {
    /// Correlation key: the communication log this receipt belongs to
    pub log_id: LogId,

    /// Dispatch generation the reporting task was launched under
    pub generation: u64,

    /// Delivery outcome
    pub outcome: DeliveryOutcome,
}

/// How a receipt was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptDisposition {
    /// Log moved to its terminal state and campaign counters advanced
    Applied,

    /// The log was already terminal; idempotent no-op
    Duplicate,

    /// The receipt or log belongs to a superseded dispatch; dropped
    StaleGeneration,
}

/// Entities the receipt transaction failed to resolve
enum ReceiptFault {
    UnknownLog,
    MissingCampaign(CampaignId),
}

/// Applies delivery receipts to campaign state.
///
/// Callable concurrently and repeatedly for the same log; the store's
/// transaction primitive serializes campaign mutations and retries
/// contention internally.
pub struct DeliveryReceiptHandler {
    store: Arc<dyn CampaignStore>,
}

impl DeliveryReceiptHandler {
    /// Create a handler over the given store
    pub fn new(store: Arc<dyn CampaignStore>) -> Self {
        Self { store }
    }

    /// Apply one delivery receipt atomically.
    ///
    /// Applying the same receipt twice produces the same campaign counters
    /// as applying it once, and any permutation of a set of receipts yields
    /// the same final aggregate.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::LogNotFound`] if the log does not exist; the
    ///   receipt is dropped without side effects and must not be retried.
    /// - [`DispatchError::CampaignNotFound`] if the owning campaign is
    ///   missing; a data-integrity fault, also without side effects.
    pub async fn report_receipt(
        &self,
        receipt: DeliveryReceipt,
    ) -> Result<ReceiptDisposition, DispatchError> {
        let mut disposition = ReceiptDisposition::Applied;
        let mut fault: Option<ReceiptFault> = None;

        self.store
            .in_transaction(&mut |tx| {
                // The transaction may be retried; start each attempt clean.
                disposition = ReceiptDisposition::Applied;
                fault = None;

                let Some(mut log) = tx.get_log(&receipt.log_id)? else {
                    fault = Some(ReceiptFault::UnknownLog);
                    return Ok(());
                };

                // Idempotency guard: a terminal log has already been counted.
                if log.status.is_terminal() {
                    disposition = ReceiptDisposition::Duplicate;
                    return Ok(());
                }

                let Some(mut campaign) = tx.get_campaign(&log.campaign_id)? else {
                    fault = Some(ReceiptFault::MissingCampaign(log.campaign_id));
                    return Ok(());
                };

                // Generation guard: receipts raced across a re-dispatch are inert.
                if receipt.generation != campaign.generation
                    || log.generation != campaign.generation
                {
                    disposition = ReceiptDisposition::StaleGeneration;
                    return Ok(());
                }

                let now = Utc::now();
                log.mark(receipt.outcome, now);
                campaign.apply_outcome(receipt.outcome, now);
                tx.put_log(log)?;
                tx.put_campaign(campaign)
            })
            .await?;

        match fault {
            Some(ReceiptFault::UnknownLog) => {
                error!(log_id = %receipt.log_id, "receipt for unknown log dropped");
                return Err(DispatchError::LogNotFound(receipt.log_id));
            }
            Some(ReceiptFault::MissingCampaign(campaign_id)) => {
                error!(
                    log_id = %receipt.log_id,
                    campaign_id = %campaign_id,
                    "owning campaign missing for receipt"
                );
                return Err(DispatchError::CampaignNotFound(campaign_id));
            }
            None => {}
        }

        match disposition {
            ReceiptDisposition::Applied => {
                debug!(log_id = %receipt.log_id, outcome = ?receipt.outcome, "receipt applied")
            }
            ReceiptDisposition::Duplicate => {
                debug!(log_id = %receipt.log_id, "duplicate receipt ignored")
            }
            ReceiptDisposition::StaleGeneration => {
                warn!(
                    log_id = %receipt.log_id,
                    generation = receipt.generation,
                    "stale-generation receipt dropped"
                )
            }
        }
        Ok(disposition)
    }
}
