use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification kinds a user can suppress. Matches the `type` column of
/// `dismissed_notifications`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissalType {
    FirstComment,
    StaleFollowup,
}

impl DismissalType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "first_comment" => Some(DismissalType::FirstComment),
            "stale_followup" => Some(DismissalType::StaleFollowup),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DismissalType::FirstComment => "first_comment",
            DismissalType::StaleFollowup => "stale_followup",
        }
    }
}

/// Business actions that implicitly silence a nudge: adding a comment
/// answers the first-comment reminder, touching the lead answers the
/// stale-followup one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadAction {
    CommentAdded,
    LeadUpdated,
}

impl LeadAction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "comment_added" => Some(LeadAction::CommentAdded),
            "lead_updated" => Some(LeadAction::LeadUpdated),
            _ => None,
        }
    }

    pub fn dismissal_type(&self) -> DismissalType {
        match self {
            LeadAction::CommentAdded => DismissalType::FirstComment,
            LeadAction::LeadUpdated => DismissalType::StaleFollowup,
        }
    }
}

/// Persisted suppression marker, unique on (user, lead, type).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DismissedNotification {
    pub user_id: Uuid,
    pub lead_id: Uuid,
    pub r#type: String, // 'type' is a reserved keyword
    pub dismissed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_to_dismissal_mapping() {
        assert_eq!(
            LeadAction::from_str("comment_added").map(|a| a.dismissal_type()),
            Some(DismissalType::FirstComment)
        );
        assert_eq!(
            LeadAction::from_str("lead_updated").map(|a| a.dismissal_type()),
            Some(DismissalType::StaleFollowup)
        );
        assert_eq!(LeadAction::from_str("lead_deleted"), None);
        assert_eq!(LeadAction::from_str(""), None);
    }

    #[test]
    fn test_dismissal_type_round_trip() {
        for t in [DismissalType::FirstComment, DismissalType::StaleFollowup] {
            assert_eq!(DismissalType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(DismissalType::from_str("unknown"), None);
    }
}
