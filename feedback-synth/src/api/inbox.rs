//! Reviewer inbox
//!
//! GET /api/inbox/:email lists every review request sent to an address.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::db::subjects;
use crate::error::{ApiError, ApiResult};
use crate::models::{ReviewRequest, ReviewerStatus};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct InboxResponse {
    pub email: String,
    pub pending: usize,
    pub requests: Vec<ReviewRequest>,
}

/// GET /api/inbox/:email
///
/// Newest invitation first. An address with no invitations gets an empty list.
pub async fn reviewer_inbox(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<InboxResponse>> {
    let email = email.trim().to_string();
    if email.is_empty() {
        return Err(ApiError::BadRequest("email is required".to_string()));
    }

    let requests = subjects::reviewer_requests_for_email(&state.db, &email).await?;
    let pending = requests
        .iter()
        .filter(|r| r.status == ReviewerStatus::Pending)
        .count();

    tracing::debug!(email = %email, total = requests.len(), pending, "Inbox listed");

    Ok(Json(InboxResponse {
        email,
        pending,
        requests,
    }))
}

pub fn inbox_routes() -> Router<AppState> {
    Router::new().route("/api/inbox/:email", get(reviewer_inbox))
}
