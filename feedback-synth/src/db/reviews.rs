//! Submitted feedback

use feedback_common::time::{from_db, now, to_db};
use feedback_common::{Error, Result};
use serde::Deserialize;
use sqlx::{Row, SqlitePool};

use crate::models::{FeedbackEntry, Frequency, Relationship};

/// One reviewer's answers as submitted through the review form
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewReview {
    pub start_doing: String,
    pub stop_doing: String,
    pub continue_doing: String,
    pub example: String,
    #[serde(default)]
    pub additional: Option<String>,
}

impl NewReview {
    /// Required fields must be non-blank
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("start_doing", &self.start_doing),
            ("stop_doing", &self.stop_doing),
            ("continue_doing", &self.continue_doing),
            ("example", &self.example),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::InvalidInput(format!("{} is required", field)));
            }
        }
        Ok(())
    }
}

pub async fn has_submitted(pool: &SqlitePool, reviewer_id: i64) -> Result<bool> {
    let exists: i64 =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE reviewer_id = ?)")
            .bind(reviewer_id)
            .fetch_one(pool)
            .await?;
    Ok(exists != 0)
}

/// Store a review; blank `additional` is stored as NULL
pub async fn insert_review(pool: &SqlitePool, reviewer_id: i64, review: &NewReview) -> Result<i64> {
    let additional = review
        .additional
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());

    let id = sqlx::query(
        r#"
        INSERT INTO reviews (reviewer_id, start_doing, stop_doing, continue_doing, example, additional, submitted_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(reviewer_id)
    .bind(review.start_doing.trim())
    .bind(review.stop_doing.trim())
    .bind(review.continue_doing.trim())
    .bind(review.example.trim())
    .bind(additional)
    .bind(to_db(&now()))
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn count_for_subject(pool: &SqlitePool, subject_id: i64) -> Result<usize> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM reviews rv
        JOIN reviewers r ON r.id = rv.reviewer_id
        WHERE r.subject_id = ?
        "#,
    )
    .bind(subject_id)
    .fetch_one(pool)
    .await?;
    Ok(count.max(0) as usize)
}

/// All feedback for a subject, in submission order, joined with reviewer details
pub async fn entries_for_subject(pool: &SqlitePool, subject_id: i64) -> Result<Vec<FeedbackEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT rv.id, rv.reviewer_id, r.name AS reviewer_name, r.relationship, r.frequency,
               rv.start_doing, rv.stop_doing, rv.continue_doing, rv.example, rv.additional,
               rv.submitted_at
        FROM reviews rv
        JOIN reviewers r ON r.id = rv.reviewer_id
        WHERE r.subject_id = ?
        ORDER BY rv.id ASC
        "#,
    )
    .bind(subject_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<FeedbackEntry> {
            let relationship: String = row.get("relationship");
            let frequency: String = row.get("frequency");
            let submitted_at: String = row.get("submitted_at");
            Ok(FeedbackEntry {
                id: row.get("id"),
                reviewer_id: row.get("reviewer_id"),
                reviewer_name: row.get("reviewer_name"),
                relationship: Relationship::parse(&relationship),
                frequency: Frequency::parse(&frequency),
                start_doing: row.get("start_doing"),
                stop_doing: row.get("stop_doing"),
                continue_doing: row.get("continue_doing"),
                example: row.get("example"),
                additional: row.get("additional"),
                submitted_at: from_db("submitted_at", &submitted_at)?,
            })
        })
        .collect()
}
