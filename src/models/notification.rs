use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::dismissal::DismissalType;

/// Derived reminder surfaced to a lead owner. Computed fresh on every
/// request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum LeadNudge {
    FirstComment {
        lead_id: Uuid,
        lead_name: String,
        message: String,
        action_url: String,
    },
    StaleFollowup {
        lead_id: Uuid,
        lead_name: String,
        message: String,
        action_url: String,
        days_since: i64,
    },
}

impl LeadNudge {
    pub fn first_comment(lead_id: Uuid, lead_name: &str) -> Self {
        LeadNudge::FirstComment {
            lead_id,
            lead_name: lead_name.to_string(),
            message: format!(
                "Lead \"{}\" has no comments yet. Add the first note to get it moving.",
                lead_name
            ),
            action_url: format!("/leads/{}#comments", lead_id),
        }
    }

    pub fn stale_followup(lead_id: Uuid, lead_name: &str, days_since: i64) -> Self {
        LeadNudge::StaleFollowup {
            lead_id,
            lead_name: lead_name.to_string(),
            message: format!(
                "No activity on \"{}\" for {} days. Time to follow up.",
                lead_name, days_since
            ),
            action_url: format!("/leads/{}#comments", lead_id),
            days_since,
        }
    }

    pub fn lead_id(&self) -> Uuid {
        match self {
            LeadNudge::FirstComment { lead_id, .. } => *lead_id,
            LeadNudge::StaleFollowup { lead_id, .. } => *lead_id,
        }
    }

    pub fn dismissal_type(&self) -> DismissalType {
        match self {
            LeadNudge::FirstComment { .. } => DismissalType::FirstComment,
            LeadNudge::StaleFollowup { .. } => DismissalType::StaleFollowup,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_tagged_union() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(LeadNudge::stale_followup(id, "Acme", 4)).unwrap();
        assert_eq!(json["type"], "stale_followup");
        assert_eq!(json["leadId"], id.to_string());
        assert_eq!(json["leadName"], "Acme");
        assert_eq!(json["daysSince"], 4);
        assert!(json["message"].as_str().unwrap().contains("4 days"));

        let json = serde_json::to_value(LeadNudge::first_comment(id, "Acme")).unwrap();
        assert_eq!(json["type"], "first_comment");
        assert_eq!(json["actionUrl"], format!("/leads/{}#comments", id));
        assert!(json.get("daysSince").is_none());
    }
}
