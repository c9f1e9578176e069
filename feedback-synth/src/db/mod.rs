//! Database access for feedback-synth
//!
//! Thin query modules over the shared SQLite schema created by
//! `feedback_common::db::init_database`.

pub mod demo;
pub mod reviews;
pub mod subjects;
pub mod summaries;

use feedback_common::db::{get_setting_i64, DEFAULT_MAX_LOCK_WAIT_MS};
use feedback_common::Result;
use sqlx::SqlitePool;

/// Upper bound for lock retries on writes, from `database_max_lock_wait_ms`
pub(crate) async fn max_lock_wait_ms(pool: &SqlitePool) -> Result<u64> {
    let value = get_setting_i64(pool, "database_max_lock_wait_ms", DEFAULT_MAX_LOCK_WAIT_MS).await?;
    Ok(value.max(0) as u64)
}
