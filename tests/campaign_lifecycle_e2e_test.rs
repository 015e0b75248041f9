//! End-to-end campaign lifecycle tests with the real simulated channel.
//!
//! These run the full path: validation, campaign creation, audience
//! expansion, asynchronous fan-out through [`SimulatedChannel`], receipt
//! handling, and status settlement observed by polling the store.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use nexus_config::{DeliveryConfig, NexusConfig};
use nexus_core::{Campaign, CampaignDefinition, CampaignId, CampaignStatus, LogStatus};
use nexus_dispatch::CampaignEngine;
use nexus_interfaces::CampaignStore;

fn fast_config(success_rate: f64) -> NexusConfig {
    NexusConfig {
        delivery: DeliveryConfig {
            min_latency_ms: 1,
            max_latency_ms: 5,
            success_rate,
        },
        ..NexusConfig::default()
    }
}

fn definition(name: &str, audience_size: u32) -> CampaignDefinition {
    CampaignDefinition {
        name: name.to_string(),
        audience_id: "aud-e2e".to_string(),
        audience_name: "E2E audience".to_string(),
        audience_size,
        objective: Some("lifecycle coverage".to_string()),
        message_template: "Hi {{customerName}}, your order has shipped.".to_string(),
        created_by_user_id: Some("user-e2e".to_string()),
    }
}

/// Poll until the campaign settles, asserting the counter invariants on
/// every observed intermediate state.
async fn settle_checking_invariants(
    store: &Arc<dyn CampaignStore>,
    id: &CampaignId,
) -> Result<Campaign> {
    let settled = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let campaign = store
                .get_campaign(id)
                .await
                .expect("store available")
                .expect("campaign exists");
            assert_eq!(
                campaign.processed_count,
                campaign.sent_count + campaign.failed_count,
                "processed must equal sent + failed"
            );
            assert!(
                campaign.processed_count <= campaign.audience_size,
                "processed must never exceed the audience size"
            );
            if campaign.is_settled() {
                return campaign;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;
    Ok(settled)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_lifecycle_all_successes() -> Result<()> {
    let engine = CampaignEngine::from_config(fast_config(1.0))?;
    let store = engine.store();

    let id = engine
        .start_campaign(definition("All successes", 25))
        .await?;
    let campaign = settle_checking_invariants(&store, &id).await?;

    assert_eq!(campaign.status, CampaignStatus::Sent);
    assert_eq!(campaign.sent_count, 25);
    assert_eq!(campaign.failed_count, 0);
    assert_eq!(campaign.processed_count, 25);

    let logs = store.list_logs_for_campaign(&id).await?;
    assert_eq!(logs.len(), 25);
    for log in &logs {
        assert_eq!(log.status, LogStatus::Sent);
        assert!(log.message.contains("your order has shipped"));
        assert!(
            !log.message.contains("{{"),
            "placeholder must be substituted: {}",
            log.message
        );
        assert!(log.customer_id.starts_with(&format!("cust-{}-", id)));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_lifecycle_all_failures() -> Result<()> {
    let engine = CampaignEngine::from_config(fast_config(0.0))?;
    let store = engine.store();

    let id = engine.start_campaign(definition("All failures", 12)).await?;
    let campaign = settle_checking_invariants(&store, &id).await?;

    assert_eq!(campaign.status, CampaignStatus::Failed);
    assert_eq!(campaign.failed_count, 12);
    assert_eq!(campaign.sent_count, 0);

    let logs = store.list_logs_for_campaign(&id).await?;
    assert!(logs.iter().all(|log| log.status == LogStatus::Failed));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_lifecycle_probabilistic_outcomes_still_settle() -> Result<()> {
    // With p = 0.5 the exact split is random; the invariants and the
    // terminal status consistency must hold regardless.
    let engine = CampaignEngine::from_config(fast_config(0.5))?;
    let store = engine.store();

    let id = engine.start_campaign(definition("Coin flips", 40)).await?;
    let campaign = settle_checking_invariants(&store, &id).await?;

    assert_eq!(campaign.processed_count, 40);
    let expected = match (campaign.failed_count, campaign.sent_count) {
        (0, _) => CampaignStatus::Sent,
        (_, 0) => CampaignStatus::Failed,
        _ => CampaignStatus::CompletedWithFailures,
    };
    assert_eq!(campaign.status, expected);

    // Every log is terminal and consistent with the aggregate counters
    let logs = store.list_logs_for_campaign(&id).await?;
    let sent = logs.iter().filter(|l| l.status == LogStatus::Sent).count() as u32;
    let failed = logs.iter().filter(|l| l.status == LogStatus::Failed).count() as u32;
    assert_eq!(sent, campaign.sent_count);
    assert_eq!(failed, campaign.failed_count);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_campaigns_do_not_interfere() -> Result<()> {
    let engine = Arc::new(CampaignEngine::from_config(fast_config(1.0))?);
    let store = engine.store();

    let mut ids = Vec::new();
    for i in 0..5 {
        let id = engine
            .start_campaign(definition(&format!("Concurrent {i}"), 10))
            .await?;
        ids.push(id);
    }

    for id in &ids {
        let campaign = settle_checking_invariants(&store, id).await?;
        assert_eq!(campaign.status, CampaignStatus::Sent);
        assert_eq!(campaign.sent_count, 10);

        // Logs are partitioned per campaign
        let logs = store.list_logs_for_campaign(id).await?;
        assert_eq!(logs.len(), 10);
        assert!(logs.iter().all(|log| log.campaign_id == *id));
    }

    assert_eq!(store.list_campaigns().await?.len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_zero_audience_settles_without_fanout() -> Result<()> {
    let engine = CampaignEngine::from_config(fast_config(1.0))?;
    let store = engine.store();

    let id = engine.start_campaign(definition("Empty audience", 0)).await?;
    let campaign = store.get_campaign(&id).await?.expect("campaign exists");

    assert_eq!(campaign.status, CampaignStatus::Sent);
    assert_eq!(campaign.processed_count, 0);
    assert!(store.list_logs_for_campaign(&id).await?.is_empty());
    Ok(())
}
