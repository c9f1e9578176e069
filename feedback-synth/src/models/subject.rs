//! Subjects under review and the reviewers invited to give feedback

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Frequency, Relationship};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// An invited reviewer; `token` is the secret part of their review link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reviewer {
    pub id: i64,
    pub subject_id: i64,
    pub name: String,
    pub email: String,
    pub relationship: Relationship,
    pub frequency: Frequency,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewerStatus {
    Pending,
    Submitted,
}

/// One invitation addressed to a reviewer's email, as listed in their inbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub subject_id: i64,
    pub subject_name: String,
    pub relationship: Relationship,
    pub frequency: Frequency,
    pub token: String,
    pub status: ReviewerStatus,
    pub created_at: DateTime<Utc>,
}
