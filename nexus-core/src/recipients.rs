//! Audience expansion into per-recipient send jobs
//!
//! The audience builder hands the engine an opaque recipient count; this
//! module turns that count into synthetic recipient descriptors with rendered
//! message text. Expansion is pure and deterministic apart from the timestamp
//! folded into customer IDs.

use chrono::{DateTime, Utc};

use crate::identifiers::CampaignId;
use crate::template;

/// Name table cycled by recipient index to synthesize display names
const FIRST_NAMES: [&str; 8] = [
    "Alex", "Jamie", "Chris", "Jordan", "Taylor", "Morgan", "Casey", "Riley",
];

/// Last-initial table cycled by recipient index
const LAST_INITIALS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A single recipient's send job: who to message and the rendered text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientJob {
    /// Synthetic customer identifier, unique across concurrent campaigns
    pub customer_id: String,

    /// Synthetic customer display name
    pub customer_name: String,

    /// Message text with the personalization placeholder substituted
    pub message: String,
}

/// Expand an audience into exactly `audience_size` send jobs.
///
/// Customer IDs combine the campaign ID, the expansion timestamp, and the
/// recipient index so they stay unique across concurrent campaigns and
/// across re-dispatches of the same campaign. Display names cycle the fixed
/// name tables by index.
pub fn expand_recipients(
    campaign_id: &CampaignId,
    audience_size: u32,
    template_text: &str,
    now: DateTime<Utc>,
) -> Vec<RecipientJob> {
    let stamp = now.timestamp_millis();
    (0..audience_size)
        .map(|index| {
            let i = index as usize;
            let first = FIRST_NAMES[i % FIRST_NAMES.len()];
            let initial = LAST_INITIALS[i % LAST_INITIALS.len()] as char;
            let customer_name = format!("{first} {initial}.");
            RecipientJob {
                customer_id: format!("cust-{campaign_id}-{stamp}-{index}"),
                message: template::render(template_text, &customer_name),
                customer_name,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_expand_produces_exactly_audience_size_jobs() {
        let id = CampaignId::new();
        assert_eq!(expand_recipients(&id, 0, "x {{customerName}}", Utc::now()).len(), 0);
        assert_eq!(expand_recipients(&id, 25, "x {{customerName}}", Utc::now()).len(), 25);
    }

    #[test]
    fn test_names_cycle_the_fixed_tables() {
        let jobs = expand_recipients(&CampaignId::new(), 10, "{{customerName}}", Utc::now());
        assert_eq!(jobs[0].customer_name, "Alex A.");
        assert_eq!(jobs[1].customer_name, "Jamie B.");
        assert_eq!(jobs[7].customer_name, "Riley H.");
        // index 8 wraps the first-name table but not the initials
        assert_eq!(jobs[8].customer_name, "Alex I.");
    }

    #[test]
    fn test_messages_are_personalized() {
        let jobs = expand_recipients(
            &CampaignId::new(),
            2,
            "Hi {{customerName}}, save 10%!",
            Utc::now(),
        );
        assert_eq!(jobs[0].message, "Hi Alex A., save 10%!");
        assert_eq!(jobs[1].message, "Hi Jamie B., save 10%!");
    }

    #[test]
    fn test_empty_template_falls_back_to_default_message() {
        let jobs = expand_recipients(&CampaignId::new(), 1, "", Utc::now());
        assert_eq!(
            jobs[0].message,
            "Hi Alex A., here's 10% off on your next order."
        );
    }

    #[test]
    fn test_customer_ids_are_unique_within_and_across_campaigns() {
        let now = Utc::now();
        let a = expand_recipients(&CampaignId::new(), 50, "{{customerName}}", now);
        let b = expand_recipients(&CampaignId::new(), 50, "{{customerName}}", now);
        let ids: HashSet<_> = a.iter().chain(b.iter()).map(|j| &j.customer_id).collect();
        assert_eq!(ids.len(), 100);
    }
}
