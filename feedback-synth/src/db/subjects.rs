//! Subject and reviewer database operations

use feedback_common::time::{from_db, now, to_db};
use feedback_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Frequency, Relationship, ReviewRequest, Reviewer, ReviewerStatus, Subject};

/// How a dashboard identifier is resolved to a subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectLookup {
    /// Exact id match
    Id(i64),
    /// Most recently created subject with this exact name
    Name(String),
}

impl SubjectLookup {
    /// Integers are ids; anything else is a name
    pub fn parse(identifier: &str) -> Self {
        let identifier = identifier.trim();
        match identifier.parse::<i64>() {
            Ok(id) => Self::Id(id),
            Err(_) => Self::Name(identifier.to_string()),
        }
    }
}

/// Resolve a subject by id or by name
pub async fn resolve_subject(pool: &SqlitePool, lookup: &SubjectLookup) -> Result<Option<Subject>> {
    match lookup {
        SubjectLookup::Id(id) => get_subject(pool, *id).await,
        SubjectLookup::Name(name) => find_latest_by_name(pool, name).await,
    }
}

pub async fn create_subject(pool: &SqlitePool, name: &str, email: &str) -> Result<Subject> {
    let created_at = now();
    let id = sqlx::query("INSERT INTO subjects (name, email, created_at) VALUES (?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(to_db(&created_at))
        .execute(pool)
        .await?
        .last_insert_rowid();

    tracing::info!(subject_id = id, name = %name, "Subject created");

    Ok(Subject {
        id,
        name: name.to_string(),
        email: email.to_string(),
        created_at,
    })
}

pub async fn get_subject(pool: &SqlitePool, id: i64) -> Result<Option<Subject>> {
    let row = sqlx::query("SELECT id, name, email, created_at FROM subjects WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(subject_from_row).transpose()
}

pub async fn find_latest_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Subject>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, email, created_at
        FROM subjects
        WHERE name = ?
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(subject_from_row).transpose()
}

pub async fn subject_count(pool: &SqlitePool) -> Result<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM subjects")
        .fetch_one(pool)
        .await?)
}

/// Invite a reviewer; generates their review token
pub async fn create_reviewer(
    pool: &SqlitePool,
    subject_id: i64,
    name: &str,
    email: &str,
    relationship: &Relationship,
    frequency: &Frequency,
) -> Result<Reviewer> {
    create_reviewer_with_token(
        pool,
        subject_id,
        name,
        email,
        relationship,
        frequency,
        &Uuid::new_v4().simple().to_string(),
    )
    .await
}

pub async fn create_reviewer_with_token(
    pool: &SqlitePool,
    subject_id: i64,
    name: &str,
    email: &str,
    relationship: &Relationship,
    frequency: &Frequency,
    token: &str,
) -> Result<Reviewer> {
    let created_at = now();
    let id = sqlx::query(
        r#"
        INSERT INTO reviewers (subject_id, name, email, relationship, frequency, token, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(subject_id)
    .bind(name)
    .bind(email)
    .bind(relationship.as_str())
    .bind(frequency.as_str())
    .bind(token)
    .bind(to_db(&created_at))
    .execute(pool)
    .await?
    .last_insert_rowid();

    tracing::info!(
        subject_id,
        reviewer_id = id,
        relationship = %relationship,
        frequency = %frequency,
        "Reviewer invited"
    );

    Ok(Reviewer {
        id,
        subject_id,
        name: name.to_string(),
        email: email.to_string(),
        relationship: relationship.clone(),
        frequency: frequency.clone(),
        token: token.to_string(),
        created_at,
    })
}

pub async fn reviewer_by_token(pool: &SqlitePool, token: &str) -> Result<Option<Reviewer>> {
    let row = sqlx::query(
        r#"
        SELECT id, subject_id, name, email, relationship, frequency, token, created_at
        FROM reviewers
        WHERE token = ?
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(reviewer_from_row).transpose()
}

/// Reviewers for a subject in invitation order, with submission status
pub async fn reviewers_with_status(
    pool: &SqlitePool,
    subject_id: i64,
) -> Result<Vec<(Reviewer, ReviewerStatus)>> {
    let rows = sqlx::query(
        r#"
        SELECT r.id, r.subject_id, r.name, r.email, r.relationship, r.frequency, r.token,
               r.created_at,
               EXISTS(SELECT 1 FROM reviews WHERE reviewer_id = r.id) AS has_review
        FROM reviewers r
        WHERE r.subject_id = ?
        ORDER BY r.created_at, r.id
        "#,
    )
    .bind(subject_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<(Reviewer, ReviewerStatus)> {
            let status = if row.get::<i64, _>("has_review") != 0 {
                ReviewerStatus::Submitted
            } else {
                ReviewerStatus::Pending
            };
            Ok((reviewer_from_row(row)?, status))
        })
        .collect()
}

pub async fn reviewer_email_exists(pool: &SqlitePool, subject_id: i64, email: &str) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, i64>(
        "SELECT EXISTS(SELECT 1 FROM reviewers WHERE subject_id = ? AND email = ?)",
    )
    .bind(subject_id)
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(exists != 0)
}

/// Every invitation sent to `email`, newest first
pub async fn reviewer_requests_for_email(pool: &SqlitePool, email: &str) -> Result<Vec<ReviewRequest>> {
    let rows = sqlx::query(
        r#"
        SELECT r.subject_id, s.name AS subject_name, r.relationship, r.frequency, r.token,
               r.created_at,
               EXISTS(SELECT 1 FROM reviews WHERE reviewer_id = r.id) AS has_review
        FROM reviewers r
        JOIN subjects s ON s.id = r.subject_id
        WHERE r.email = ?
        ORDER BY r.created_at DESC, r.id DESC
        "#,
    )
    .bind(email)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<ReviewRequest> {
            let relationship: String = row.get("relationship");
            let frequency: String = row.get("frequency");
            let created_at: String = row.get("created_at");
            let status = if row.get::<i64, _>("has_review") != 0 {
                ReviewerStatus::Submitted
            } else {
                ReviewerStatus::Pending
            };
            Ok(ReviewRequest {
                subject_id: row.get("subject_id"),
                subject_name: row.get("subject_name"),
                relationship: Relationship::parse(&relationship),
                frequency: Frequency::parse(&frequency),
                token: row.get("token"),
                status,
                created_at: from_db("created_at", &created_at)?,
            })
        })
        .collect()
}

fn subject_from_row(row: &SqliteRow) -> Result<Subject> {
    let created_at: String = row.get("created_at");
    Ok(Subject {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        created_at: from_db("created_at", &created_at)?,
    })
}

fn reviewer_from_row(row: &SqliteRow) -> Result<Reviewer> {
    let relationship: String = row.get("relationship");
    let frequency: String = row.get("frequency");
    let created_at: String = row.get("created_at");
    Ok(Reviewer {
        id: row.get("id"),
        subject_id: row.get("subject_id"),
        name: row.get("name"),
        email: row.get("email"),
        relationship: Relationship::parse(&relationship),
        frequency: Frequency::parse(&frequency),
        token: row.get("token"),
        created_at: from_db("created_at", &created_at)?,
    })
}
