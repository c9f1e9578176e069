//! Feedback entries and reviewer categories

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reviewer's organisational relationship to the subject.
///
/// Parsing never fails: an unrecognised category is kept verbatim and weighted
/// with the fallback factor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Relationship {
    Manager,
    Peer,
    DirectReport,
    CrossFunctional,
    Unrecognised(String),
}

impl Relationship {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "manager" => Self::Manager,
            "peer" => Self::Peer,
            "direct_report" => Self::DirectReport,
            "cross_functional" | "xfn" => Self::CrossFunctional,
            _ => Self::Unrecognised(value.to_string()),
        }
    }

    /// Storage / wire form
    pub fn as_str(&self) -> &str {
        match self {
            Self::Manager => "manager",
            Self::Peer => "peer",
            Self::DirectReport => "direct_report",
            Self::CrossFunctional => "cross_functional",
            Self::Unrecognised(raw) => raw,
        }
    }

    /// Display label used in prompts and rationale text
    pub fn label(&self) -> &str {
        match self {
            Self::Manager => "Manager",
            Self::Peer => "Peer",
            Self::DirectReport => "Direct Report",
            Self::CrossFunctional => "Cross-functional",
            Self::Unrecognised(raw) => raw,
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Relationship {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl Serialize for Relationship {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Relationship {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// How often reviewer and subject collaborate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Frequency {
    Weekly,
    Monthly,
    Rarely,
    Unrecognised(String),
}

impl Frequency {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "rarely" => Self::Rarely,
            _ => Self::Unrecognised(value.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Rarely => "rarely",
            Self::Unrecognised(raw) => raw,
        }
    }

    /// Frequency labels are the lower-case words themselves
    pub fn label(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Frequency {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl Serialize for Frequency {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// One reviewer's submitted feedback about a subject.
///
/// Immutable once stored; the aggregation engine only reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: i64,
    pub reviewer_id: i64,
    pub reviewer_name: String,
    pub relationship: Relationship,
    pub frequency: Frequency,
    pub start_doing: String,
    pub stop_doing: String,
    pub continue_doing: String,
    pub example: String,
    pub additional: Option<String>,
    pub submitted_at: DateTime<Utc>,
}
