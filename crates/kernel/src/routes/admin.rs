//! Admin moderation routes.
//!
//! Guarded by a static bearer token compared in constant time.

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::delete,
};
use subtle::ConstantTimeEq;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Create the admin router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/reviews/{id}", delete(delete_review))
}

/// Whether the request carries the configured admin token.
pub fn is_admin(expected: Option<&str>, headers: &HeaderMap) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    let Some(token) = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    else {
        return false;
    };
    token.as_bytes().ct_eq(expected.as_bytes()).into()
}

async fn delete_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if !is_admin(state.config().admin_token.as_deref(), &headers) {
        return Err(AppError::Unauthorized);
    }

    let provider_id = state.directory().remove_review(id)?;
    info!(review_id = %id, provider_id = %provider_id, "review removed");

    Ok(StatusCode::NO_CONTENT)
}
