//! Manager dashboard handlers
//!
//! `:identifier` is a subject id, or a subject name (most recent match).

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::subjects::{self, SubjectLookup};
use crate::error::{ApiError, ApiResult};
use crate::models::{Frequency, Relationship, ReviewerStatus, Subject, Summary, SummaryState};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ReviewerStatusView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub relationship: Relationship,
    pub frequency: Frequency,
    pub status: ReviewerStatus,
}

/// GET /api/manager/:identifier response
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub subject: Subject,
    pub reviewers: Vec<ReviewerStatusView>,
    pub submitted_count: usize,
    pub total_reviewers: usize,
    pub state: SummaryState,
    pub summary: Option<Summary>,
}

/// Response for every summary-mutating endpoint
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub state: SummaryState,
    pub summary: Summary,
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        Self {
            state: summary.state(),
            summary,
        }
    }
}

/// PUT /api/manager/:identifier/summary request
#[derive(Debug, Deserialize)]
pub struct EditSummaryRequest {
    pub content: String,
}

async fn resolve(state: &AppState, identifier: &str) -> ApiResult<Subject> {
    let lookup = SubjectLookup::parse(identifier);
    subjects::resolve_subject(&state.db, &lookup)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Subject {}", identifier)))
}

/// GET /api/manager/:identifier
pub async fn dashboard(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> ApiResult<Json<DashboardResponse>> {
    let subject = resolve(&state, &identifier).await?;

    let reviewers: Vec<ReviewerStatusView> = subjects::reviewers_with_status(&state.db, subject.id)
        .await?
        .into_iter()
        .map(|(reviewer, status)| ReviewerStatusView {
            id: reviewer.id,
            name: reviewer.name,
            email: reviewer.email,
            relationship: reviewer.relationship,
            frequency: reviewer.frequency,
            status,
        })
        .collect();
    let submitted_count = reviewers
        .iter()
        .filter(|r| r.status == ReviewerStatus::Submitted)
        .count();

    let summary = state.lifecycle.get(subject.id).await?;

    Ok(Json(DashboardResponse {
        total_reviewers: reviewers.len(),
        submitted_count,
        reviewers,
        state: SummaryState::of(summary.as_ref()),
        summary,
        subject,
    }))
}

/// POST /api/manager/:identifier/generate
pub async fn generate_summary(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> ApiResult<Json<SummaryResponse>> {
    let subject = resolve(&state, &identifier).await?;
    let summary = state.lifecycle.create(subject.id).await?;
    Ok(Json(summary.into()))
}

/// PUT /api/manager/:identifier/summary
pub async fn edit_summary(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    Json(request): Json<EditSummaryRequest>,
) -> ApiResult<Json<SummaryResponse>> {
    if request.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content is required".to_string()));
    }

    let subject = resolve(&state, &identifier).await?;
    let summary = state.lifecycle.edit(subject.id, &request.content).await?;
    Ok(Json(summary.into()))
}

/// POST /api/manager/:identifier/regenerate
pub async fn regenerate_summary(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> ApiResult<Json<SummaryResponse>> {
    let subject = resolve(&state, &identifier).await?;
    let summary = state.lifecycle.regenerate(subject.id).await?;
    Ok(Json(summary.into()))
}

/// POST /api/manager/:identifier/finalise
pub async fn finalise_summary(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> ApiResult<Json<SummaryResponse>> {
    let subject = resolve(&state, &identifier).await?;
    let summary = state.lifecycle.finalise(subject.id).await?;
    Ok(Json(summary.into()))
}

pub fn summary_routes() -> Router<AppState> {
    Router::new()
        .route("/api/manager/:identifier", get(dashboard))
        .route("/api/manager/:identifier/generate", post(generate_summary))
        .route("/api/manager/:identifier/summary", put(edit_summary))
        .route("/api/manager/:identifier/regenerate", post(regenerate_summary))
        .route("/api/manager/:identifier/finalise", post(finalise_summary))
}
