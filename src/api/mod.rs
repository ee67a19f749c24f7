use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use sha2::{Digest, Sha256};
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::AppState;

pub mod handlers;

/// Build the API router. All routes are relative — the caller mounts this
/// under `/api`. Every route sits behind the session middleware.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/me", get(handlers::me))
        .route("/leads", get(handlers::list_leads).post(handlers::create_lead))
        .route(
            "/leads/:id",
            get(handlers::get_lead).put(handlers::update_lead),
        )
        .route(
            "/leads/:id/comments",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route("/notifications/lead-nudges", get(handlers::lead_nudges))
        .route(
            "/notifications/dismiss",
            post(handlers::dismiss).delete(handlers::clear_dismissals),
        )
        .route(
            "/notifications/dismiss-on-action",
            post(handlers::dismiss_on_action),
        )
        .layer(middleware::from_fn_with_state(state.clone(), session_auth))
        .layer(TraceLayer::new_for_http())
        .fallback(fallback_404)
        .with_state(state)
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Sessions are stored hashed; the raw token never touches the database.
pub fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Middleware: resolves `Authorization: Bearer <token>` to a `CurrentUser`
/// and stashes it in request extensions. 401 on anything else.
async fn session_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .ok_or(AppError::Unauthorized)?;

    let user = state
        .db
        .resolve_session(&hash_session_token(&token))
        .await?
        .ok_or(AppError::Unauthorized)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
