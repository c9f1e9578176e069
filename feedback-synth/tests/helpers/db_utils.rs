//! Database Test Utilities
//!
//! In-memory database plus a lifecycle wired to a scripted generator.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use feedback_common::db::{init_database, init_memory_database};
use feedback_synth::config::GenerationSettings;
use feedback_synth::db::reviews::{insert_review, NewReview};
use feedback_synth::db::subjects::{create_reviewer, create_subject};
use feedback_synth::models::{Frequency, Relationship};
use feedback_synth::services::{RegenerationTrigger, SummaryGenerator, SummaryLifecycle};
use feedback_synth::AppState;
use sqlx::SqlitePool;

use super::fake_generator::ScriptedGenerator;

pub struct TestContext {
    pub pool: SqlitePool,
    pub generator: Arc<ScriptedGenerator>,
    pub lifecycle: SummaryLifecycle,
    pub trigger: RegenerationTrigger,
    pub state: AppState,
}

pub async fn setup() -> TestContext {
    setup_with(ScriptedGenerator::new()).await
}

pub async fn setup_with(generator: Arc<ScriptedGenerator>) -> TestContext {
    let pool = init_memory_database()
        .await
        .expect("Failed to create in-memory database");
    context_for(pool, generator)
}

/// File-backed WAL database at `db_path`, created if missing
pub async fn setup_on_disk(db_path: &Path) -> TestContext {
    let pool = init_database(db_path)
        .await
        .expect("Failed to open file database");
    context_for(pool, ScriptedGenerator::new())
}

fn context_for(pool: SqlitePool, generator: Arc<ScriptedGenerator>) -> TestContext {
    let summary_generator = SummaryGenerator::new(generator.clone(), GenerationSettings::default());
    let state = AppState::new(pool.clone(), summary_generator);

    TestContext {
        pool,
        generator,
        lifecycle: state.lifecycle.clone(),
        trigger: state.trigger.clone(),
        state,
    }
}

pub async fn add_subject(pool: &SqlitePool, name: &str) -> i64 {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    create_subject(pool, name, &email).await.unwrap().id
}

/// Invite a reviewer without submitting; returns the review token
pub async fn add_reviewer(
    pool: &SqlitePool,
    subject_id: i64,
    name: &str,
    relationship: &str,
    frequency: &str,
) -> String {
    let email = format!("{}@example.com", name.to_lowercase());
    create_reviewer(
        pool,
        subject_id,
        name,
        &email,
        &Relationship::parse(relationship),
        &Frequency::parse(frequency),
    )
    .await
    .unwrap()
    .token
}

/// Invite a reviewer and record their submission directly, bypassing the trigger
pub async fn add_feedback(
    pool: &SqlitePool,
    subject_id: i64,
    name: &str,
    relationship: &str,
    frequency: &str,
) -> i64 {
    let email = format!("{}@example.com", name.to_lowercase());
    let reviewer = create_reviewer(
        pool,
        subject_id,
        name,
        &email,
        &Relationship::parse(relationship),
        &Frequency::parse(frequency),
    )
    .await
    .unwrap();

    let review = NewReview {
        start_doing: format!("{} says start", name),
        stop_doing: format!("{} says stop", name),
        continue_doing: format!("{} says continue", name),
        example: format!("{} example", name),
        additional: None,
    };
    insert_review(pool, reviewer.id, &review).await.unwrap();
    reviewer.id
}

/// Hash of every stored column of the subject's summary row
pub async fn summary_fingerprint(pool: &SqlitePool, subject_id: i64) -> Option<u64> {
    let row: Option<(i64, String, String, i64, Option<String>, String)> = sqlx::query_as(
        r#"
        SELECT id, content, weighting_explanation, finalised, finalised_at, updated_at
        FROM summaries WHERE subject_id = ?
        "#,
    )
    .bind(subject_id)
    .fetch_optional(pool)
    .await
    .unwrap();

    row.map(|row| {
        let mut hasher = DefaultHasher::new();
        row.hash(&mut hasher);
        hasher.finish()
    })
}
