//! Re-dispatch behavior: counter resets, generation bumps, log replacement,
//! and isolation from deliveries still in flight from a superseded dispatch.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::watch;

use nexus_config::{DeliveryConfig, NexusConfig};
use nexus_core::{CampaignDefinition, CampaignStatus, DeliveryOutcome, RecipientJob};
use nexus_dispatch::{CampaignDispatcher, CampaignEngine};
use nexus_interfaces::{CampaignStore, DeliveryChannel, DeliveryError};
use nexus_storage::InMemoryStore;

fn definition(audience_size: u32) -> CampaignDefinition {
    CampaignDefinition {
        name: "Re-dispatch".to_string(),
        audience_id: "aud-redispatch".to_string(),
        audience_name: "Re-dispatch audience".to_string(),
        audience_size,
        objective: None,
        message_template: "Hi {{customerName}}, second time's the charm.".to_string(),
        created_by_user_id: None,
    }
}

/// Channel that holds every delivery until the gate opens, then succeeds
struct GatedChannel {
    gate: watch::Receiver<bool>,
}

#[async_trait]
impl DeliveryChannel for GatedChannel {
    async fn deliver(&self, _job: &RecipientJob) -> Result<DeliveryOutcome, DeliveryError> {
        let mut gate = self.gate.clone();
        while !*gate.borrow() {
            if gate.changed().await.is_err() {
                break;
            }
        }
        Ok(DeliveryOutcome::Sent)
    }
}

async fn settle(store: &Arc<dyn CampaignStore>, id: &nexus_core::CampaignId) -> nexus_core::Campaign {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let campaign = store.get_campaign(id).await.unwrap().unwrap();
            if campaign.is_settled() {
                return campaign;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("campaign did not settle in time")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_redispatch_after_settlement_resets_and_resettles() -> Result<()> {
    let config = NexusConfig {
        delivery: DeliveryConfig {
            min_latency_ms: 1,
            max_latency_ms: 5,
            success_rate: 1.0,
        },
        ..NexusConfig::default()
    };
    let engine = CampaignEngine::from_config(config)?;
    let store = engine.store();

    let id = engine.start_campaign(definition(8)).await?;
    let first = settle(&store, &id).await;
    assert_eq!(first.generation, 1);
    assert_eq!(first.status, CampaignStatus::Sent);

    engine.dispatch(&id).await?;
    let second = settle(&store, &id).await;
    assert_eq!(second.generation, 2);
    assert_eq!(second.status, CampaignStatus::Sent);
    assert_eq!(second.sent_count, 8);
    assert_eq!(second.processed_count, 8);

    let logs = store.list_logs_for_campaign(&id).await?;
    assert_eq!(logs.len(), 8, "prior generation's logs must be replaced");
    assert!(logs.iter().all(|log| log.generation == 2));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_redispatch_while_in_flight_never_double_counts() -> Result<()> {
    let (open_gate, gate) = watch::channel(false);
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let dispatcher = CampaignDispatcher::new(
        Arc::clone(&store) as Arc<dyn CampaignStore>,
        Arc::new(GatedChannel { gate }),
    );
    let store: Arc<dyn CampaignStore> = store;

    // First dispatch: every delivery is stuck behind the gate
    let id = dispatcher.start_campaign(definition(10)).await?;
    let blocked = store.get_campaign(&id).await?.unwrap();
    assert_eq!(blocked.status, CampaignStatus::Processing);
    assert_eq!(blocked.processed_count, 0);

    // Supersede it while all 10 deliveries are still in flight
    dispatcher.dispatch(&id).await?;
    let superseded = store.get_campaign(&id).await?.unwrap();
    assert_eq!(superseded.generation, 2);
    assert_eq!(superseded.processed_count, 0);

    // Release both generations' deliveries at once
    open_gate.send(true).ok();

    let settled = settle(&store, &id).await;
    assert_eq!(settled.status, CampaignStatus::Sent);
    assert_eq!(
        settled.processed_count, 10,
        "only the live generation's receipts may count"
    );
    assert_eq!(settled.sent_count, 10);

    let logs = store.list_logs_for_campaign(&id).await?;
    assert_eq!(logs.len(), 10);
    assert!(logs.iter().all(|log| log.generation == 2));
    Ok(())
}
