//! Error types for feedback-synth
//!
//! [`SummaryError`] is the lifecycle taxonomy returned by foreground
//! operations; [`ApiError`] maps it (and everything else) onto HTTP.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::GenerationError;

/// Summary lifecycle failures, distinguishable by kind
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Fewer than two feedback entries exist for the subject
    #[error("At least 2 feedback entries are required to generate a summary (found {found})")]
    InsufficientInput { found: usize },

    /// `create` when a summary already exists
    #[error("Summary already exists for subject {0}. Use regenerate to replace it.")]
    AlreadyExists(i64),

    /// `edit`/`finalise` with no summary
    #[error("Summary not found for subject {0}")]
    NotFound(i64),

    #[error("Subject not found: {0}")]
    SubjectNotFound(i64),

    /// `edit`/`regenerate` on a finalised summary
    #[error("Summary for subject {0} is finalised and cannot be changed")]
    Finalised(i64),

    #[error("Summary for subject {0} is already finalised")]
    AlreadyFinalised(i64),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Storage error: {0}")]
    Storage(#[from] feedback_common::Error),
}

impl From<sqlx::Error> for SummaryError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(feedback_common::Error::Database(err))
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g., feedback already submitted
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Summary lifecycle error
    #[error(transparent)]
    Summary(#[from] SummaryError),

    /// feedback-common error
    #[error("Common error: {0}")]
    Common(#[from] feedback_common::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Common(feedback_common::Error::Database(err))
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Common(feedback_common::Error::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            ApiError::Common(feedback_common::Error::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            ApiError::Common(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMMON_ERROR"),
            ApiError::Summary(err) => summary_parts(err),
        }
    }
}

fn summary_parts(err: &SummaryError) -> (StatusCode, &'static str) {
    match err {
        SummaryError::InsufficientInput { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_FEEDBACK")
        }
        SummaryError::AlreadyExists(_) => (StatusCode::CONFLICT, "SUMMARY_EXISTS"),
        SummaryError::NotFound(_) | SummaryError::SubjectNotFound(_) => {
            (StatusCode::NOT_FOUND, "NOT_FOUND")
        }
        SummaryError::Finalised(_) => (StatusCode::CONFLICT, "SUMMARY_FINALISED"),
        SummaryError::AlreadyFinalised(_) => (StatusCode::CONFLICT, "ALREADY_FINALISED"),
        SummaryError::Generation(GenerationError::RateLimited { .. }) => {
            (StatusCode::TOO_MANY_REQUESTS, "GENERATION_RATE_LIMITED")
        }
        SummaryError::Generation(GenerationError::Timeout)
        | SummaryError::Generation(GenerationError::Transport(_)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "GENERATION_UNAVAILABLE")
        }
        SummaryError::Generation(_) => (StatusCode::BAD_GATEWAY, "GENERATION_FAILED"),
        SummaryError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();

        if status.is_server_error() {
            tracing::error!(code = error_code, error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
