//! Lead-nudge computation.
//!
//! A pure pass over the caller's visible, open leads: no side effects, no
//! persistence. The store hands us one row per eligible lead with the latest
//! comment timestamp already joined in; we derive reminders from elapsed
//! whole days and cap the output.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::NudgeConfig;
use crate::models::dismissal::DismissalType;
use crate::models::notification::LeadNudge;

/// Per-lead activity snapshot, one row of the bulk scan.
/// `last_comment_at` is `None` when the lead has no comments at all.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeadActivity {
    pub lead_id: Uuid,
    pub lead_name: String,
    pub created_at: DateTime<Utc>,
    pub last_comment_at: Option<DateTime<Utc>>,
}

/// Capped notification list plus the pre-cap candidate count, so consumers
/// can render "N more" without a second fetch.
#[derive(Debug, Serialize)]
pub struct NudgeBatch {
    pub notifications: Vec<LeadNudge>,
    pub total: usize,
}

/// Compute nudges for one user.
///
/// Leads are traversed newest-created first and the output preserves that
/// order. `dismissed` holds the caller's suppression set; pass an empty set
/// to leave filtering to the consumer.
pub fn compute_nudges(
    leads: &[LeadActivity],
    dismissed: &HashSet<(Uuid, DismissalType)>,
    now: DateTime<Utc>,
    cfg: &NudgeConfig,
) -> NudgeBatch {
    let mut ordered: Vec<&LeadActivity> = leads.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut candidates = Vec::new();
    for lead in ordered {
        let days_since_created = (now - lead.created_at).num_days();
        let days_since_last_comment = lead
            .last_comment_at
            .map(|t| (now - t).num_days())
            .unwrap_or(days_since_created);

        // The two rules are checked independently; their predicates happen
        // to be mutually exclusive per lead (zero vs. at least one comment).
        if lead.last_comment_at.is_none()
            && days_since_created >= cfg.first_comment_after_days
            && !dismissed.contains(&(lead.lead_id, DismissalType::FirstComment))
        {
            candidates.push(LeadNudge::first_comment(lead.lead_id, &lead.lead_name));
        }

        if lead.last_comment_at.is_some()
            && days_since_last_comment >= cfg.stale_after_days
            && !dismissed.contains(&(lead.lead_id, DismissalType::StaleFollowup))
        {
            candidates.push(LeadNudge::stale_followup(
                lead.lead_id,
                &lead.lead_name,
                days_since_last_comment,
            ));
        }
    }

    let total = candidates.len();
    candidates.truncate(cfg.max_notifications);
    NudgeBatch {
        notifications: candidates,
        total,
    }
}
