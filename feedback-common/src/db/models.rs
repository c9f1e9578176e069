//! Settings table access

use sqlx::SqlitePool;

use crate::Result;

/// Read an integer setting, falling back to `default` when missing or unparsable
pub async fn get_setting_i64(pool: &SqlitePool, key: &str, default: i64) -> Result<i64> {
    let value = sqlx::query_scalar::<_, Option<String>>("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value
        .flatten()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default))
}
