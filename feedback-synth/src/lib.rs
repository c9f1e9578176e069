//! feedback-synth library interface
//!
//! Exposes the router and services for the binary and integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::{ApiError, ApiResult, SummaryError};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::services::{RegenerationTrigger, SummaryGenerator, SummaryLifecycle};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub lifecycle: SummaryLifecycle,
    pub trigger: RegenerationTrigger,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, generator: SummaryGenerator) -> Self {
        let lifecycle = SummaryLifecycle::new(db.clone(), generator);
        Self {
            db,
            trigger: RegenerationTrigger::new(lifecycle.clone()),
            lifecycle,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::subject_routes())
        .merge(api::review_routes())
        .merge(api::inbox_routes())
        .merge(api::summary_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
