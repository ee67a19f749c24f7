use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Append-only note on a lead, listed newest first.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub author_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
