use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Pipeline statuses. Stored as TEXT so source-specific variants coming in
/// from imports survive round trips; unknown strings map to `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Won,
    Lost,
    Closed,
    Other(String),
}

impl LeadStatus {
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "NEW" => LeadStatus::New,
            "CONTACTED" => LeadStatus::Contacted,
            "QUALIFIED" => LeadStatus::Qualified,
            "PROPOSAL" => LeadStatus::Proposal,
            "WON" => LeadStatus::Won,
            "LOST" => LeadStatus::Lost,
            "CLOSED" => LeadStatus::Closed,
            other => LeadStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LeadStatus::New => "NEW",
            LeadStatus::Contacted => "CONTACTED",
            LeadStatus::Qualified => "QUALIFIED",
            LeadStatus::Proposal => "PROPOSAL",
            LeadStatus::Won => "WON",
            LeadStatus::Lost => "LOST",
            LeadStatus::Closed => "CLOSED",
            LeadStatus::Other(s) => s,
        }
    }

    /// Leads in these statuses never generate nudges.
    pub fn is_closed(&self) -> bool {
        matches!(self, LeadStatus::Won | LeadStatus::Lost | LeadStatus::Closed)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub value: f64,
    pub currency: String,
    pub owner_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every status transition; drives the aging display only,
    /// not the nudge thresholds.
    pub status_changed_at: DateTime<Utc>,
}
