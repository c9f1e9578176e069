//! Summary record and lifecycle state
//!
//! Absent → Draft → Finalised. Finalisation is one-way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Synthesized narrative for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub id: i64,
    pub subject_id: i64,
    pub content: String,
    pub weighting_explanation: String,
    pub finalised: bool,
    /// Set iff `finalised`
    pub finalised_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Summary {
    pub fn state(&self) -> SummaryState {
        if self.finalised {
            SummaryState::Finalised
        } else {
            SummaryState::Draft
        }
    }
}

/// Lifecycle state of a subject's summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryState {
    Absent,
    Draft,
    Finalised,
}

impl SummaryState {
    pub fn of(summary: Option<&Summary>) -> Self {
        summary.map_or(Self::Absent, Summary::state)
    }

    pub fn is_locked(self) -> bool {
        self == Self::Finalised
    }
}
