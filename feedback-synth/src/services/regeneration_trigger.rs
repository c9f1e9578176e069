//! Background regeneration after new feedback
//!
//! `fire` spawns a detached task and returns immediately. Whatever happens
//! inside the task is logged and discarded; it never reaches the request
//! that recorded the feedback.

use tokio::task::JoinHandle;

use crate::db::{reviews, summaries};
use crate::error::SummaryError;

use super::summary_generator::MIN_FEEDBACK_ENTRIES;
use super::summary_lifecycle::SummaryLifecycle;

/// What a single trigger run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    SkippedInsufficientFeedback { count: usize },
    SkippedFinalised,
    Regenerated,
    /// Error already logged
    Failed(String),
}

#[derive(Clone)]
pub struct RegenerationTrigger {
    lifecycle: SummaryLifecycle,
}

impl RegenerationTrigger {
    pub fn new(lifecycle: SummaryLifecycle) -> Self {
        Self { lifecycle }
    }

    /// Schedule a regeneration for `subject_id`. The handle may be dropped.
    pub fn fire(&self, subject_id: i64) -> JoinHandle<TriggerOutcome> {
        let trigger = self.clone();
        tokio::spawn(async move { trigger.run(subject_id).await })
    }

    /// Run the guarded regeneration inline
    pub async fn run(&self, subject_id: i64) -> TriggerOutcome {
        let _guard = self.lifecycle.lock_subject(subject_id).await;

        match self.run_locked(subject_id).await {
            Ok(outcome) => {
                tracing::debug!(subject_id, outcome = ?outcome, "Regeneration trigger finished");
                outcome
            }
            Err(e) => {
                tracing::error!(subject_id, error = %e, "Background summary regeneration failed");
                TriggerOutcome::Failed(e.to_string())
            }
        }
    }

    async fn run_locked(&self, subject_id: i64) -> Result<TriggerOutcome, SummaryError> {
        let db = self.lifecycle.db();

        let count = reviews::count_for_subject(db, subject_id).await?;
        if count < MIN_FEEDBACK_ENTRIES {
            tracing::debug!(subject_id, count, "Not enough feedback to summarise yet");
            return Ok(TriggerOutcome::SkippedInsufficientFeedback { count });
        }

        if let Some(existing) = summaries::load_summary(db, subject_id).await? {
            if existing.finalised {
                tracing::debug!(subject_id, "Summary finalised, skipping regeneration");
                return Ok(TriggerOutcome::SkippedFinalised);
            }
        }

        self.lifecycle.regenerate_locked(subject_id).await?;
        Ok(TriggerOutcome::Regenerated)
    }
}
