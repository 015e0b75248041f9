//! Communication log entity definition
//!
//! One `CommunicationLog` exists per recipient per dispatch. It is the
//! append-only audit record correlating a send attempt with its delivery
//! outcome, and its ID is the correlation key carried by delivery receipts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::{CampaignId, LogId};

/// Outcome of a single delivery attempt, as reported by the vendor channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryOutcome {
    /// The message was delivered
    Sent,
    /// The message could not be delivered
    Failed,
}

/// Per-recipient delivery state.
///
/// Transitions only `Pending -> Sent` or `Pending -> Failed`; both outcomes
/// are terminal and never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogStatus {
    /// Created at dispatch time, no receipt yet
    Pending,
    /// Delivery succeeded
    Sent,
    /// Delivery failed
    Failed,
}

impl LogStatus {
    /// Whether a receipt has already been applied to this log
    pub fn is_terminal(&self) -> bool {
        matches!(self, LogStatus::Sent | LogStatus::Failed)
    }
}

impl From<DeliveryOutcome> for LogStatus {
    fn from(outcome: DeliveryOutcome) -> Self {
        match outcome {
            DeliveryOutcome::Sent => LogStatus::Sent,
            DeliveryOutcome::Failed => LogStatus::Failed,
        }
    }
}

/// Communication log entry for one recipient of one campaign dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicationLog {
    /// Unique identifier, assigned at creation
    pub id: LogId,

    /// Owning campaign
    pub campaign_id: CampaignId,

    /// Synthetic customer identifier
    pub customer_id: String,

    /// Synthetic customer display name
    pub customer_name: String,

    /// Fully rendered message text sent to this recipient
    pub message: String,

    /// Delivery state
    pub status: LogStatus,

    /// Dispatch generation this log was created under; receipts from a
    /// superseded dispatch are rejected against it
    pub generation: u64,

    /// Last update time
    pub timestamp: DateTime<Utc>,
}

impl CommunicationLog {
    /// Create a new pending log entry for one recipient
    pub fn new(
        campaign_id: CampaignId,
        customer_id: String,
        customer_name: String,
        message: String,
        generation: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LogId::new(),
            campaign_id,
            customer_id,
            customer_name,
            message,
            status: LogStatus::Pending,
            generation,
            timestamp: now,
        }
    }

    /// Record the delivery outcome, moving the log to its terminal state
    pub fn mark(&mut self, outcome: DeliveryOutcome, now: DateTime<Utc>) {
        self.status = outcome.into();
        self.timestamp = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_log_is_pending() {
        let log = CommunicationLog::new(
            CampaignId::new(),
            "cust-1".to_string(),
            "Alex A.".to_string(),
            "Hi Alex A.!".to_string(),
            1,
            Utc::now(),
        );
        assert_eq!(log.status, LogStatus::Pending);
        assert!(!log.status.is_terminal());
    }

    #[test]
    fn test_mark_moves_to_terminal_state() {
        let mut log = CommunicationLog::new(
            CampaignId::new(),
            "cust-1".to_string(),
            "Alex A.".to_string(),
            "Hi Alex A.!".to_string(),
            1,
            Utc::now(),
        );
        log.mark(DeliveryOutcome::Sent, Utc::now());
        assert_eq!(log.status, LogStatus::Sent);
        assert!(log.status.is_terminal());
    }

    #[test]
    fn test_outcome_maps_to_matching_status() {
        assert_eq!(LogStatus::from(DeliveryOutcome::Sent), LogStatus::Sent);
        assert_eq!(LogStatus::from(DeliveryOutcome::Failed), LogStatus::Failed);
    }
}
