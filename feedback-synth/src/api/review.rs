//! Reviewer-facing handlers
//!
//! GET/POST /api/review/:token. A successful submission arms the
//! regeneration trigger; the response does not wait for it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::db::reviews::{self, NewReview};
use crate::db::subjects;
use crate::error::{ApiError, ApiResult};
use crate::models::{Frequency, Relationship, Reviewer};
use crate::AppState;

/// GET /api/review/:token response
#[derive(Debug, Serialize)]
pub struct ReviewContextResponse {
    pub reviewer_name: String,
    pub subject_name: String,
    pub relationship: Relationship,
    pub frequency: Frequency,
    pub already_submitted: bool,
}

/// POST /api/review/:token response
#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    pub review_id: i64,
    pub subject_id: i64,
}

async fn reviewer_for(state: &AppState, token: &str) -> ApiResult<Reviewer> {
    subjects::reviewer_by_token(&state.db, token)
        .await?
        .ok_or_else(|| ApiError::NotFound("Review link".to_string()))
}

/// GET /api/review/:token
pub async fn review_context(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<ReviewContextResponse>> {
    let reviewer = reviewer_for(&state, &token).await?;
    let subject = subjects::get_subject(&state.db, reviewer.subject_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Subject {}", reviewer.subject_id)))?;
    let already_submitted = reviews::has_submitted(&state.db, reviewer.id).await?;

    Ok(Json(ReviewContextResponse {
        reviewer_name: reviewer.name,
        subject_name: subject.name,
        relationship: reviewer.relationship,
        frequency: reviewer.frequency,
        already_submitted,
    }))
}

/// POST /api/review/:token
pub async fn submit_review(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(review): Json<NewReview>,
) -> ApiResult<(StatusCode, Json<SubmitReviewResponse>)> {
    let reviewer = reviewer_for(&state, &token).await?;

    if reviews::has_submitted(&state.db, reviewer.id).await? {
        return Err(ApiError::Conflict("Feedback already submitted".to_string()));
    }
    review.validate()?;

    let review_id = match reviews::insert_review(&state.db, reviewer.id, &review).await {
        Ok(id) => id,
        Err(feedback_common::Error::Database(sqlx::Error::Database(db_err)))
            if db_err.is_unique_violation() =>
        {
            return Err(ApiError::Conflict("Feedback already submitted".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        subject_id = reviewer.subject_id,
        reviewer_id = reviewer.id,
        review_id,
        "Feedback submitted"
    );

    // Detached; outcome is logged by the trigger
    let _ = state.trigger.fire(reviewer.subject_id);

    Ok((
        StatusCode::CREATED,
        Json(SubmitReviewResponse {
            review_id,
            subject_id: reviewer.subject_id,
        }),
    ))
}

pub fn review_routes() -> Router<AppState> {
    Router::new().route("/api/review/:token", get(review_context).post(submit_review))
}
