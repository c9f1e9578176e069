//! Database initialization
//!
//! Creates the database file on first run and applies the schema idempotently
//! on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Default for `database_max_lock_wait_ms`
pub const DEFAULT_MAX_LOCK_WAIT_MS: i64 = 5000;

/// Default for `database_lock_retry_ms` (SQLite busy_timeout)
pub const DEFAULT_LOCK_RETRY_MS: i64 = 250;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows the background regeneration task to read while a request writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    prepare(&pool).await?;

    Ok(pool)
}

/// In-memory database with the full schema.
///
/// Limited to one connection that never expires, since every SQLite
/// `:memory:` connection is a separate database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    prepare(&pool).await?;

    Ok(pool)
}

async fn prepare(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    create_settings_table(pool).await?;
    create_subjects_table(pool).await?;
    create_reviewers_table(pool).await?;
    create_reviews_table(pool).await?;
    create_summaries_table(pool).await?;

    init_default_settings(pool).await?;

    let timeout_ms =
        crate::db::get_setting_i64(pool, "database_lock_retry_ms", DEFAULT_LOCK_RETRY_MS).await?;
    let pragma_sql = format!("PRAGMA busy_timeout = {}", timeout_ms);
    sqlx::query(&pragma_sql).execute(pool).await?;

    info!("Database busy timeout set to {} ms", timeout_ms);

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the subjects table (people being reviewed)
pub async fn create_subjects_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS subjects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_subjects_name ON subjects(name)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the reviewers table
///
/// One invitation per email per subject. Relationship and frequency are
/// stored verbatim; rows with unknown categories are weighted with the
/// fallback factor.
pub async fn create_reviewers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviewers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_id INTEGER NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            relationship TEXT NOT NULL,
            frequency TEXT NOT NULL,
            token TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL,
            UNIQUE (subject_id, email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviewers_subject ON reviewers(subject_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the reviews table (one submission per reviewer)
pub async fn create_reviews_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            reviewer_id INTEGER NOT NULL UNIQUE REFERENCES reviewers(id) ON DELETE CASCADE,
            start_doing TEXT NOT NULL,
            stop_doing TEXT NOT NULL,
            continue_doing TEXT NOT NULL,
            example TEXT NOT NULL,
            additional TEXT,
            submitted_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the summaries table (at most one row per subject)
pub async fn create_summaries_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS summaries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_id INTEGER NOT NULL UNIQUE REFERENCES subjects(id) ON DELETE CASCADE,
            content TEXT NOT NULL,
            weighting_explanation TEXT NOT NULL,
            finalised INTEGER NOT NULL DEFAULT 0,
            finalised_at TEXT,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
///
/// Missing keys are created; NULL values are reset to the default.
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(
        pool,
        "database_max_lock_wait_ms",
        &DEFAULT_MAX_LOCK_WAIT_MS.to_string(),
    )
    .await?;
    ensure_setting(
        pool,
        "database_lock_retry_ms",
        &DEFAULT_LOCK_RETRY_MS.to_string(),
    )
    .await?;

    Ok(())
}

async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    // INSERT OR IGNORE tolerates concurrent initialization
    let inserted = sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(default_value)
        .execute(pool)
        .await?
        .rows_affected();

    if inserted > 0 {
        info!("Initialized setting '{}' with default value: {}", key, default_value);
        return Ok(());
    }

    let reset = sqlx::query("UPDATE settings SET value = ? WHERE key = ? AND value IS NULL")
        .bind(default_value)
        .bind(key)
        .execute(pool)
        .await?
        .rows_affected();

    if reset > 0 {
        info!("Reset NULL setting '{}' to default value: {}", key, default_value);
    }

    Ok(())
}
