//! Subject and reviewer invitation handlers
//!
//! POST /api/subjects, POST /api/subjects/:id/reviewers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::db::subjects;
use crate::error::{ApiError, ApiResult};
use crate::models::{Frequency, Relationship, Reviewer, Subject};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSubjectRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct InviteReviewerRequest {
    pub name: String,
    pub email: String,
    pub relationship: String,
    pub frequency: String,
}

fn require(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

/// POST /api/subjects
pub async fn create_subject(
    State(state): State<AppState>,
    Json(request): Json<CreateSubjectRequest>,
) -> ApiResult<(StatusCode, Json<Subject>)> {
    require("name", &request.name)?;
    require("email", &request.email)?;

    let subject =
        subjects::create_subject(&state.db, request.name.trim(), request.email.trim()).await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

/// POST /api/subjects/:id/reviewers
///
/// Each email may be invited once per subject. Categories must be one of the
/// known values (`xfn` is accepted for cross-functional).
pub async fn invite_reviewer(
    State(state): State<AppState>,
    Path(subject_id): Path<i64>,
    Json(request): Json<InviteReviewerRequest>,
) -> ApiResult<(StatusCode, Json<Reviewer>)> {
    require("name", &request.name)?;
    require("email", &request.email)?;
    require("relationship", &request.relationship)?;
    require("frequency", &request.frequency)?;

    let relationship = Relationship::parse(&request.relationship);
    if matches!(relationship, Relationship::Unrecognised(_)) {
        return Err(ApiError::BadRequest(
            "Invalid relationship. Must be one of: manager, peer, direct_report, cross_functional"
                .to_string(),
        ));
    }
    let frequency = Frequency::parse(&request.frequency);
    if matches!(frequency, Frequency::Unrecognised(_)) {
        return Err(ApiError::BadRequest(
            "Invalid frequency. Must be one of: weekly, monthly, rarely".to_string(),
        ));
    }

    if subjects::get_subject(&state.db, subject_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Subject {}", subject_id)));
    }

    let email = request.email.trim();
    if subjects::reviewer_email_exists(&state.db, subject_id, email).await? {
        return Err(duplicate_reviewer());
    }

    match subjects::create_reviewer(
        &state.db,
        subject_id,
        request.name.trim(),
        email,
        &relationship,
        &frequency,
    )
    .await
    {
        Ok(reviewer) => Ok((StatusCode::CREATED, Json(reviewer))),
        // Lost a race with a concurrent invitation for the same email
        Err(feedback_common::Error::Database(sqlx::Error::Database(db_err)))
            if db_err.is_unique_violation() =>
        {
            Err(duplicate_reviewer())
        }
        Err(e) => Err(e.into()),
    }
}

fn duplicate_reviewer() -> ApiError {
    ApiError::BadRequest("This reviewer has already been added for this subject".to_string())
}

pub fn subject_routes() -> Router<AppState> {
    Router::new()
        .route("/api/subjects", post(create_subject))
        .route("/api/subjects/:id/reviewers", post(invite_reviewer))
}
