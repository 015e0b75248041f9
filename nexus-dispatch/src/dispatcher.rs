//! Campaign dispatch orchestration
//!
//! Creates campaign records, expands audiences, and fans out one independent
//! asynchronous task per recipient. The orchestrator never recomputes status
//! itself; every counter and status transition goes through the receipt
//! handler so the derivation rule lives in exactly one place.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use nexus_core::{
    expand_recipients, Campaign, CampaignDefinition, CampaignId, CommunicationLog,
    DeliveryOutcome,
};
use nexus_interfaces::{CampaignStore, DeliveryChannel, StoreError};

use crate::error::DispatchError;
use crate::receipt::{DeliveryReceipt, DeliveryReceiptHandler};

/// Orchestrates campaign creation and per-recipient fan-out.
///
/// Dispatch is fire-and-forget: callers get the campaign ID back as soon as
/// recipient tasks are spawned, and observe completion through the campaign
/// record. Per-recipient failures are contained; they never abort sibling
/// tasks or the dispatch itself.
pub struct CampaignDispatcher {
    store: Arc<dyn CampaignStore>,
    channel: Arc<dyn DeliveryChannel>,
    receipts: Arc<DeliveryReceiptHandler>,
}

impl CampaignDispatcher {
    /// Create a dispatcher over the given store and delivery channel
    pub fn new(store: Arc<dyn CampaignStore>, channel: Arc<dyn DeliveryChannel>) -> Self {
        let receipts = Arc::new(DeliveryReceiptHandler::new(Arc::clone(&store)));
        Self {
            store,
            channel,
            receipts,
        }
    }

    /// Access the receipt handler, e.g. for wiring a real vendor callback
    pub fn receipt_handler(&self) -> Arc<DeliveryReceiptHandler> {
        Arc::clone(&self.receipts)
    }

    /// Validate, create, and dispatch a new campaign.
    ///
    /// Fails synchronously on an invalid definition or an unavailable store,
    /// in both cases without partial effects.
    pub async fn start_campaign(
        &self,
        definition: CampaignDefinition,
    ) -> Result<CampaignId, DispatchError> {
        definition.validate()?;
        let campaign = Campaign::new(definition, Utc::now());
        let campaign = self.store.create_campaign(campaign).await?;
        info!(
            campaign_id = %campaign.id,
            audience_size = campaign.audience_size,
            "campaign created"
        );
        self.dispatch(&campaign.id).await?;
        Ok(campaign.id)
    }

    /// Dispatch (or re-dispatch) an existing campaign.
    ///
    /// Re-dispatching resets counters under a fresh generation and clears
    /// the prior dispatch's logs before fanning out again; receipts still in
    /// flight from the superseded dispatch are rejected by the receipt
    /// handler's generation guard.
    pub async fn dispatch(&self, campaign_id: &CampaignId) -> Result<(), DispatchError> {
        let mut dispatched: Option<Campaign> = None;
        self.store
            .in_transaction(&mut |tx| {
                let Some(mut campaign) = tx.get_campaign(campaign_id)? else {
                    return Err(StoreError::campaign_not_found(campaign_id));
                };
                campaign.begin_dispatch(Utc::now());
                dispatched = Some(campaign.clone());
                tx.put_campaign(campaign)
            })
            .await
            .map_err(|err| match err {
                StoreError::NotFound { .. } => DispatchError::CampaignNotFound(*campaign_id),
                other => DispatchError::Store(other),
            })?;
        let campaign = dispatched.ok_or_else(|| {
            DispatchError::Store(StoreError::Internal(
                "dispatch transaction committed without a campaign".to_string(),
            ))
        })?;

        if campaign.audience_size == 0 {
            // Vacuously fully sent; nothing to fan out.
            info!(campaign_id = %campaign.id, "zero-audience campaign settled as Sent");
            return Ok(());
        }

        let removed = self.store.delete_logs_for_campaign(campaign_id).await?;
        if removed > 0 {
            debug!(campaign_id = %campaign_id, removed, "cleared logs from prior dispatch");
        }

        let jobs = expand_recipients(
            campaign_id,
            campaign.audience_size,
            &campaign.message_template,
            Utc::now(),
        );

        let mut spawned = 0u32;
        for job in jobs {
            let log = CommunicationLog::new(
                *campaign_id,
                job.customer_id.clone(),
                job.customer_name.clone(),
                job.message.clone(),
                campaign.generation,
                Utc::now(),
            );
            let log = match self.store.create_log(log).await {
                Ok(log) => log,
                Err(err) => {
                    // This recipient is never reported; the campaign will
                    // observably stall below 100% processed.
                    warn!(
                        campaign_id = %campaign_id,
                        customer_id = %job.customer_id,
                        %err,
                        "failed to persist communication log, recipient skipped"
                    );
                    continue;
                }
            };

            let channel = Arc::clone(&self.channel);
            let receipts = Arc::clone(&self.receipts);
            let generation = campaign.generation;
            tokio::spawn(async move {
                let outcome = match channel.deliver(&job).await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        warn!(log_id = %log.id, %err, "delivery channel error, recording failure");
                        DeliveryOutcome::Failed
                    }
                };
                let receipt = DeliveryReceipt {
                    log_id: log.id,
                    generation,
                    outcome,
                };
                if let Err(err) = receipts.report_receipt(receipt).await {
                    error!(log_id = %log.id, %err, "failed to apply delivery receipt");
                }
            });
            spawned += 1;
        }

        info!(
            campaign_id = %campaign_id,
            recipients = spawned,
            "campaign dispatch fanned out"
        );
        Ok(())
    }
}
