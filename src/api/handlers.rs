use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::currency;
use crate::errors::AppError;
use crate::models::comment::Comment;
use crate::models::dismissal::{DismissalType, LeadAction};
use crate::models::lead::{Lead, LeadStatus};
use crate::models::user::CurrentUser;
use crate::nudge::engine::{compute_nudges, NudgeBatch};
use crate::store::postgres::LeadPatch;
use crate::AppState;

// ── Request / Response DTOs ──────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissRequest {
    pub lead_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DismissOnActionRequest {
    pub lead_id: Option<Uuid>,
    pub action_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub name: Option<String>,
    pub status: Option<String>,
    /// Coerced through the currency parser: strings, numbers and junk are
    /// all accepted, junk becomes 0.
    pub value: Option<serde_json::Value>,
    pub currency: Option<String>,
    pub owner_id: Option<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadRequest {
    pub name: Option<String>,
    pub status: Option<String>,
    pub value: Option<serde_json::Value>,
    pub currency: Option<String>,
    pub owner_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct LeadListParams {
    /// Optional display currency; convertible values are shown in it.
    pub currency: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub content: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadResponse {
    #[serde(flatten)]
    pub lead: Lead,
    pub display_value: String,
}

impl LeadResponse {
    fn new(lead: Lead, display_currency: Option<&str>) -> Self {
        let display_value = match display_currency {
            Some(target) if convertible(&lead.currency, target) => {
                currency::format(currency::convert(lead.value, &lead.currency, target), target)
            }
            _ => currency::format(lead.value, &lead.currency),
        };
        Self { lead, display_value }
    }
}

/// A target currency is honored only when the conversion is meaningful:
/// same currency, or the supported USD↔INR pair.
fn convertible(from: &str, to: &str) -> bool {
    let pair = |c: &str| c.eq_ignore_ascii_case("USD") || c.eq_ignore_ascii_case("INR");
    from.eq_ignore_ascii_case(to) || (pair(from) && pair(to))
}

// ── Identity ─────────────────────────────────────────────────

/// GET /api/me — the resolved per-request identity.
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<CurrentUser> {
    Json(user)
}

// ── Notifications ────────────────────────────────────────────

/// GET /api/notifications/lead-nudges
///
/// One bulk lead-activity scan plus (when dismissal filtering is enabled)
/// one suppression-set read, then a pure in-memory pass. Fails closed: any
/// storage error aborts the whole request with no partial list.
pub async fn lead_nudges(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<NudgeBatch>, AppError> {
    let leads = state.db.lead_activity(user.lead_scope()).await?;
    let dismissed = if state.config.nudge.filter_dismissed {
        state.db.dismissed_set(user.id).await?
    } else {
        HashSet::new()
    };
    let batch = compute_nudges(&leads, &dismissed, Utc::now(), &state.config.nudge);
    Ok(Json(batch))
}

/// POST /api/notifications/dismiss — body { leadId, type }
pub async fn dismiss(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<DismissRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (lead_id, kind) = match (payload.lead_id, payload.kind) {
        (Some(l), Some(k)) => (l, k),
        _ => {
            return Err(AppError::InvalidArgument(
                "leadId and type are required".into(),
            ))
        }
    };
    let kind = DismissalType::from_str(&kind)
        .ok_or_else(|| AppError::InvalidArgument(format!("unknown notification type '{}'", kind)))?;

    if !state.db.lead_exists(lead_id).await? {
        return Err(AppError::NotFound("lead"));
    }
    state.db.upsert_dismissal(user.id, lead_id, kind).await?;
    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/notifications/dismiss — clears all of the caller's dismissals.
pub async fn clear_dismissals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let cleared = state.db.clear_dismissals(user.id).await?;
    tracing::debug!(user_id = %user.id, cleared, "cleared dismissed notifications");
    Ok(Json(json!({ "success": true })))
}

/// POST /api/notifications/dismiss-on-action — body { leadId, actionType }
pub async fn dismiss_on_action(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<DismissOnActionRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (lead_id, action) = match (payload.lead_id, payload.action_type) {
        (Some(l), Some(a)) => (l, a),
        _ => {
            return Err(AppError::InvalidArgument(
                "leadId and actionType are required".into(),
            ))
        }
    };
    let action = LeadAction::from_str(&action)
        .ok_or_else(|| AppError::InvalidArgument(format!("unrecognized actionType '{}'", action)))?;

    if !state.db.lead_exists(lead_id).await? {
        return Err(AppError::NotFound("lead"));
    }
    state
        .db
        .upsert_dismissal(user.id, lead_id, action.dismissal_type())
        .await?;
    Ok(Json(json!({ "success": true })))
}

// ── Leads ────────────────────────────────────────────────────

/// GET /api/leads — admin sees all, everyone else their own.
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<LeadListParams>,
) -> Result<Json<Vec<LeadResponse>>, AppError> {
    let leads = state.db.list_leads(user.lead_scope()).await?;
    Ok(Json(
        leads
            .into_iter()
            .map(|l| LeadResponse::new(l, params.currency.as_deref()))
            .collect(),
    ))
}

/// POST /api/leads
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateLeadRequest>,
) -> Result<(StatusCode, Json<LeadResponse>), AppError> {
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::InvalidArgument("name is required".into()))?;

    let status = payload
        .status
        .as_deref()
        .map(|s| LeadStatus::from_str(s).as_str().to_string())
        .unwrap_or_else(|| LeadStatus::New.as_str().to_string());
    let value = payload
        .value
        .as_ref()
        .map(currency::parse_number)
        .unwrap_or(0.0);
    let cur = payload
        .currency
        .as_deref()
        .map(str::to_uppercase)
        .unwrap_or_else(|| "USD".into());
    let owner = payload.owner_id.or(Some(user.id));

    let lead = state
        .db
        .insert_lead(name, &status, value, &cur, owner)
        .await?;
    Ok((StatusCode::CREATED, Json(LeadResponse::new(lead, None))))
}

/// GET /api/leads/:id
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeadResponse>, AppError> {
    let lead = state.db.get_lead(id).await?.ok_or(AppError::NotFound("lead"))?;
    if !user.can_modify_lead(lead.owner_id) {
        return Err(AppError::Forbidden);
    }
    Ok(Json(LeadResponse::new(lead, None)))
}

/// PUT /api/leads/:id — owner or admin only. A successful update counts as
/// the `lead_updated` action and implicitly dismisses the caller's
/// stale-followup nudge for this lead.
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLeadRequest>,
) -> Result<Json<LeadResponse>, AppError> {
    let existing = state.db.get_lead(id).await?.ok_or(AppError::NotFound("lead"))?;
    if !user.can_modify_lead(existing.owner_id) {
        return Err(AppError::Forbidden);
    }

    let patch = LeadPatch {
        name: payload
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        status: payload
            .status
            .as_deref()
            .map(|s| LeadStatus::from_str(s).as_str().to_string()),
        value: payload.value.as_ref().map(currency::parse_number),
        currency: payload.currency.map(|c| c.to_uppercase()),
        owner_id: payload.owner_id,
        is_active: payload.is_active,
    };

    let lead = state
        .db
        .update_lead(id, &patch)
        .await?
        .ok_or(AppError::NotFound("lead"))?;

    state
        .db
        .upsert_dismissal(user.id, id, LeadAction::LeadUpdated.dismissal_type())
        .await?;

    Ok(Json(LeadResponse::new(lead, None)))
}

// ── Comments ─────────────────────────────────────────────────

/// GET /api/leads/:id/comments — newest first.
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let lead = state.db.get_lead(id).await?.ok_or(AppError::NotFound("lead"))?;
    if !user.can_modify_lead(lead.owner_id) {
        return Err(AppError::Forbidden);
    }
    Ok(Json(state.db.list_comments(id).await?))
}

/// POST /api/leads/:id/comments — owner or admin only. Adding a comment is
/// the `comment_added` action and implicitly dismisses the caller's
/// first-comment nudge for this lead.
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let content = payload
        .content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidArgument("content is required".into()))?;

    let lead = state.db.get_lead(id).await?.ok_or(AppError::NotFound("lead"))?;
    if !user.can_modify_lead(lead.owner_id) {
        return Err(AppError::Forbidden);
    }

    let comment = state.db.insert_comment(id, user.id, content).await?;
    state
        .db
        .upsert_dismissal(user.id, id, LeadAction::CommentAdded.dismissal_type())
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convertible_pairs() {
        assert!(convertible("USD", "INR"));
        assert!(convertible("inr", "usd"));
        assert!(convertible("EUR", "EUR"));
        assert!(!convertible("EUR", "USD"));
        assert!(!convertible("USD", "GBP"));
    }

    #[test]
    fn test_lead_response_display_value() {
        let lead = Lead {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            status: "NEW".into(),
            value: 100.0,
            currency: "USD".into(),
            owner_id: None,
            is_active: true,
            created_at: Utc::now(),
            status_changed_at: Utc::now(),
        };
        assert_eq!(LeadResponse::new(lead.clone(), None).display_value, "$100");
        assert_eq!(
            LeadResponse::new(lead.clone(), Some("INR")).display_value,
            "₹8,300"
        );
        // Unsupported target falls back to the stored currency.
        assert_eq!(LeadResponse::new(lead, Some("EUR")).display_value, "$100");
    }
}
