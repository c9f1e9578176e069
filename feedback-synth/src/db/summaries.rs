//! Summary persistence
//!
//! At most one row per subject. Every mutating statement carries a
//! `finalised = 0` guard so a finalised row is never rewritten, whatever
//! the caller checked beforehand.

use chrono::{DateTime, Utc};
use feedback_common::time::{from_db, from_db_opt, now, to_db};
use feedback_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::models::Summary;
use crate::utils::retry_on_lock;

use super::max_lock_wait_ms;

/// Result of a guarded write
#[derive(Debug, Clone, PartialEq)]
pub enum GuardedWrite<T> {
    Applied(T),
    /// The stored summary is finalised; nothing was written
    Locked,
}

pub async fn load_summary(pool: &SqlitePool, subject_id: i64) -> Result<Option<Summary>> {
    let row = sqlx::query(
        r#"
        SELECT id, subject_id, content, weighting_explanation, finalised, finalised_at, updated_at
        FROM summaries
        WHERE subject_id = ?
        "#,
    )
    .bind(subject_id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(summary_from_row).transpose()
}

/// Insert the first summary for a subject
pub async fn insert_summary(
    pool: &SqlitePool,
    subject_id: i64,
    content: &str,
    weighting_explanation: &str,
) -> Result<Summary> {
    let max_wait_ms = max_lock_wait_ms(pool).await?;
    let updated_at = now();

    let id = retry_on_lock("insert_summary", max_wait_ms, || async {
        let result = sqlx::query(
            r#"
            INSERT INTO summaries (subject_id, content, weighting_explanation, finalised, updated_at)
            VALUES (?, ?, ?, 0, ?)
            "#,
        )
        .bind(subject_id)
        .bind(content)
        .bind(weighting_explanation)
        .bind(to_db(&updated_at))
        .execute(pool)
        .await?;
        Ok(result.last_insert_rowid())
    })
    .await?;

    Ok(draft(id, subject_id, content, weighting_explanation, updated_at))
}

/// Replace a draft (or absent) summary with fresh content in one transaction
pub async fn replace_summary(
    pool: &SqlitePool,
    subject_id: i64,
    content: &str,
    weighting_explanation: &str,
) -> Result<GuardedWrite<Summary>> {
    let max_wait_ms = max_lock_wait_ms(pool).await?;
    let updated_at = now();

    let id = retry_on_lock("replace_summary", max_wait_ms, || async {
        let mut tx = pool.begin().await?;

        let finalised: Option<i64> =
            sqlx::query_scalar("SELECT finalised FROM summaries WHERE subject_id = ?")
                .bind(subject_id)
                .fetch_optional(&mut *tx)
                .await?;
        if finalised.unwrap_or(0) != 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("DELETE FROM summaries WHERE subject_id = ? AND finalised = 0")
            .bind(subject_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            r#"
            INSERT INTO summaries (subject_id, content, weighting_explanation, finalised, updated_at)
            VALUES (?, ?, ?, 0, ?)
            "#,
        )
        .bind(subject_id)
        .bind(content)
        .bind(weighting_explanation)
        .bind(to_db(&updated_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(result.last_insert_rowid()))
    })
    .await?;

    Ok(match id {
        Some(id) => GuardedWrite::Applied(draft(
            id,
            subject_id,
            content,
            weighting_explanation,
            updated_at,
        )),
        None => GuardedWrite::Locked,
    })
}

/// Overwrite draft content; the weighting explanation is left as generated
pub async fn update_content(
    pool: &SqlitePool,
    subject_id: i64,
    content: &str,
) -> Result<GuardedWrite<()>> {
    let max_wait_ms = max_lock_wait_ms(pool).await?;
    let updated_at = to_db(&now());

    let rows = retry_on_lock("update_summary_content", max_wait_ms, || async {
        let result = sqlx::query(
            "UPDATE summaries SET content = ?, updated_at = ? WHERE subject_id = ? AND finalised = 0",
        )
        .bind(content)
        .bind(&updated_at)
        .bind(subject_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    })
    .await?;

    Ok(if rows > 0 {
        GuardedWrite::Applied(())
    } else {
        GuardedWrite::Locked
    })
}

/// Lock the summary; content and explanation are not touched
pub async fn mark_finalised(pool: &SqlitePool, subject_id: i64) -> Result<GuardedWrite<()>> {
    let max_wait_ms = max_lock_wait_ms(pool).await?;
    let finalised_at = to_db(&now());

    let rows = retry_on_lock("finalise_summary", max_wait_ms, || async {
        let result = sqlx::query(
            r#"
            UPDATE summaries
            SET finalised = 1, finalised_at = ?, updated_at = ?
            WHERE subject_id = ? AND finalised = 0
            "#,
        )
        .bind(&finalised_at)
        .bind(&finalised_at)
        .bind(subject_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    })
    .await?;

    Ok(if rows > 0 {
        GuardedWrite::Applied(())
    } else {
        GuardedWrite::Locked
    })
}

fn draft(
    id: i64,
    subject_id: i64,
    content: &str,
    weighting_explanation: &str,
    updated_at: DateTime<Utc>,
) -> Summary {
    Summary {
        id,
        subject_id,
        content: content.to_string(),
        weighting_explanation: weighting_explanation.to_string(),
        finalised: false,
        finalised_at: None,
        updated_at,
    }
}

fn summary_from_row(row: &SqliteRow) -> Result<Summary> {
    let finalised_at: Option<String> = row.get("finalised_at");
    let updated_at: String = row.get("updated_at");
    Ok(Summary {
        id: row.get("id"),
        subject_id: row.get("subject_id"),
        content: row.get("content"),
        weighting_explanation: row.get("weighting_explanation"),
        finalised: row.get::<i64, _>("finalised") != 0,
        finalised_at: from_db_opt("finalised_at", finalised_at.as_deref())?,
        updated_at: from_db("updated_at", &updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::subjects::create_subject;
    use feedback_common::db::init_memory_database;

    async fn setup() -> (SqlitePool, i64) {
        let pool = init_memory_database().await.unwrap();
        let subject = create_subject(&pool, "Alex", "alex@example.com").await.unwrap();
        (pool, subject.id)
    }

    #[tokio::test]
    async fn test_insert_and_load() {
        let (pool, subject_id) = setup().await;
        assert!(load_summary(&pool, subject_id).await.unwrap().is_none());

        let inserted = insert_summary(&pool, subject_id, "narrative", "why").await.unwrap();
        let loaded = load_summary(&pool, subject_id).await.unwrap().unwrap();

        assert_eq!(loaded.id, inserted.id);
        assert_eq!(loaded.content, "narrative");
        assert!(!loaded.finalised);
        assert!(loaded.finalised_at.is_none());
    }

    #[tokio::test]
    async fn test_replace_creates_when_absent_and_replaces_draft() {
        let (pool, subject_id) = setup().await;

        let first = replace_summary(&pool, subject_id, "v1", "e1").await.unwrap();
        assert!(matches!(first, GuardedWrite::Applied(_)));

        replace_summary(&pool, subject_id, "v2", "e2").await.unwrap();
        let loaded = load_summary(&pool, subject_id).await.unwrap().unwrap();
        assert_eq!(loaded.content, "v2");
        assert_eq!(loaded.weighting_explanation, "e2");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM summaries")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_finalised_row_is_never_rewritten() {
        let (pool, subject_id) = setup().await;
        insert_summary(&pool, subject_id, "final words", "why").await.unwrap();

        assert_eq!(mark_finalised(&pool, subject_id).await.unwrap(), GuardedWrite::Applied(()));
        let before = load_summary(&pool, subject_id).await.unwrap().unwrap();
        assert!(before.finalised_at.is_some());

        assert_eq!(mark_finalised(&pool, subject_id).await.unwrap(), GuardedWrite::Locked);
        assert_eq!(
            update_content(&pool, subject_id, "edited").await.unwrap(),
            GuardedWrite::Locked
        );
        assert_eq!(
            replace_summary(&pool, subject_id, "new", "new").await.unwrap(),
            GuardedWrite::Locked
        );

        let after = load_summary(&pool, subject_id).await.unwrap().unwrap();
        assert_eq!(before, after);
    }
}
