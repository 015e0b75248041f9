//! Campaign entity and aggregate state machine
//!
//! The campaign record is the single point of aggregation for per-recipient
//! delivery outcomes. All counter and status transitions live here so that
//! the receipt handler and dispatcher never duplicate the derivation rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identifiers::CampaignId;
use crate::log::DeliveryOutcome;
use crate::template;

/// Campaign lifecycle status.
///
/// Serialized variant names are a wire contract with the dashboard UI
/// (`CompletedWithFailures` in particular) and must stay exactly as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    /// Authored in the UI but never dispatched through the engine
    Draft,
    /// Created, dispatch not yet begun
    Pending,
    /// Dispatch in flight, at least one recipient outstanding
    Processing,
    /// Every recipient was delivered successfully
    Sent,
    /// Every recipient failed
    Failed,
    /// All recipients processed with a mix of outcomes
    CompletedWithFailures,
}

impl CampaignStatus {
    /// Whether this status is terminal; counters never change past it
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CampaignStatus::Sent | CampaignStatus::Failed | CampaignStatus::CompletedWithFailures
        )
    }
}

/// Input required to create a campaign, handed in by the (external)
/// campaign-authoring UI.
///
/// `audience_size` is an opaque count produced by the audience builder; the
/// engine performs no membership validation. Being unsigned, a negative size
/// is unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignDefinition {
    /// Human-readable campaign name
    pub name: String,

    /// Identifier of the targeted audience
    pub audience_id: String,

    /// Display name of the targeted audience
    pub audience_name: String,

    /// Number of recipients in the audience, fixed at creation
    pub audience_size: u32,

    /// Optional campaign objective
    pub objective: Option<String>,

    /// Message template containing the `{{customerName}}` placeholder
    pub message_template: String,

    /// Identity of the creating user
    pub created_by_user_id: Option<String>,
}

impl CampaignDefinition {
    /// Validate the definition before any persistent state is created
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.message_template.trim().is_empty() {
            return Err(ValidationError::EmptyTemplate);
        }
        if !template::contains_placeholder(&self.message_template) {
            return Err(ValidationError::MissingPlaceholder);
        }
        Ok(())
    }
}

/// Campaign entity: definition attributes plus mutable aggregate state.
///
/// # Invariants
/// - `processed_count == sent_count + failed_count` at all times
/// - `processed_count <= audience_size`; equality marks completion
/// - counters are monotonically non-decreasing within one dispatch
///   generation and frozen once the status is terminal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    /// Unique identifier, assigned at creation
    pub id: CampaignId,

    /// Human-readable campaign name
    pub name: String,

    /// Identifier of the targeted audience
    pub audience_id: String,

    /// Display name of the targeted audience
    pub audience_name: String,

    /// Number of recipients, fixed at creation
    pub audience_size: u32,

    /// Optional campaign objective
    pub objective: Option<String>,

    /// Message template containing the `{{customerName}}` placeholder
    pub message_template: String,

    /// Identity of the creating user
    pub created_by_user_id: Option<String>,

    /// Lifecycle status
    pub status: CampaignStatus,

    /// Recipients delivered successfully so far
    pub sent_count: u32,

    /// Recipients that failed delivery so far
    pub failed_count: u32,

    /// Recipients processed so far; always `sent_count + failed_count`
    pub processed_count: u32,

    /// Dispatch generation, incremented on every (re-)dispatch
    pub generation: u64,

    /// When the campaign was created
    pub created_at: DateTime<Utc>,

    /// When the aggregate state last changed
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Create a campaign in `Pending` with all counters at zero
    pub fn new(definition: CampaignDefinition, now: DateTime<Utc>) -> Self {
        Self {
            id: CampaignId::new(),
            name: definition.name,
            audience_id: definition.audience_id,
            audience_name: definition.audience_name,
            audience_size: definition.audience_size,
            objective: definition.objective,
            message_template: definition.message_template,
            created_by_user_id: definition.created_by_user_id,
            status: CampaignStatus::Pending,
            sent_count: 0,
            failed_count: 0,
            processed_count: 0,
            generation: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether every recipient has been processed and the status is terminal
    pub fn is_settled(&self) -> bool {
        self.status.is_terminal()
    }

    /// Reset aggregate state for a (re-)dispatch.
    ///
    /// Counters return to zero under a fresh generation and the status moves
    /// to `Processing`. A zero-audience campaign is vacuously fully sent and
    /// goes straight to `Sent`.
    pub fn begin_dispatch(&mut self, now: DateTime<Utc>) {
        self.sent_count = 0;
        self.failed_count = 0;
        self.processed_count = 0;
        self.generation += 1;
        self.status = if self.audience_size == 0 {
            CampaignStatus::Sent
        } else {
            CampaignStatus::Processing
        };
        self.updated_at = now;
    }

    /// Fold one delivery outcome into the aggregate.
    ///
    /// Exactly one counter is incremented and the status rederived. Once the
    /// status is terminal this is a no-op; the receipt handler's duplicate
    /// guard should make that branch unreachable.
    pub fn apply_outcome(&mut self, outcome: DeliveryOutcome, now: DateTime<Utc>) {
        if self.status.is_terminal() {
            return;
        }
        match outcome {
            DeliveryOutcome::Sent => self.sent_count += 1,
            DeliveryOutcome::Failed => self.failed_count += 1,
        }
        self.processed_count = self.sent_count + self.failed_count;
        self.status = self.derive_status();
        self.updated_at = now;
    }

    /// Derive the status from the current counters.
    ///
    /// Complete campaigns settle to `Sent` (no failures), `Failed` (no
    /// successes), or `CompletedWithFailures`; partially processed campaigns
    /// are `Processing`.
    fn derive_status(&self) -> CampaignStatus {
        if self.audience_size == 0 {
            return CampaignStatus::Sent;
        }
        if self.processed_count >= self.audience_size {
            if self.failed_count == 0 {
                CampaignStatus::Sent
            } else if self.sent_count == 0 {
                CampaignStatus::Failed
            } else {
                CampaignStatus::CompletedWithFailures
            }
        } else if self.processed_count > 0 {
            CampaignStatus::Processing
        } else {
            self.status
        }
    }
}
