//! Summary lifecycle controller
//!
//! State per subject: Absent → Draft → Finalised. Every operation holds the
//! subject's mutex across its read-check-write sequence, so foreground calls
//! and background regenerations for one subject are serialized. Storage
//! writes additionally refuse to touch a finalised row.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use sqlx::SqlitePool;
use tokio::sync::OwnedMutexGuard;

use crate::db::summaries::{self, GuardedWrite};
use crate::db::{reviews, subjects};
use crate::error::SummaryError;
use crate::models::{Subject, Summary, SummaryState};

use super::summary_generator::SummaryGenerator;

/// One async mutex per subject id, created on first use and dropped from the
/// map once nobody holds or waits on it
#[derive(Clone, Default)]
pub struct SubjectLocks {
    inner: Arc<Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>>,
}

impl SubjectLocks {
    pub async fn acquire(&self, subject_id: i64) -> SubjectGuard {
        let lock = {
            let mut map = self.map();
            map.entry(subject_id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        SubjectGuard {
            guard: Some(lock.lock_owned().await),
            subject_id,
            locks: self.clone(),
        }
    }

    /// Subjects with a live lock entry
    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn map(&self) -> MutexGuard<'_, HashMap<i64, Arc<tokio::sync::Mutex<()>>>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn release(&self, subject_id: i64) {
        let mut map = self.map();
        // Waiters clone the Arc under this map lock, so a count of one means
        // only the map still refers to it.
        if map
            .get(&subject_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&subject_id);
        }
    }
}

/// Held for the duration of one subject operation
pub struct SubjectGuard {
    guard: Option<OwnedMutexGuard<()>>,
    subject_id: i64,
    locks: SubjectLocks,
}

impl Drop for SubjectGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(self.subject_id);
    }
}

#[derive(Clone)]
pub struct SummaryLifecycle {
    db: SqlitePool,
    generator: SummaryGenerator,
    locks: SubjectLocks,
}

impl SummaryLifecycle {
    pub fn new(db: SqlitePool, generator: SummaryGenerator) -> Self {
        Self {
            db,
            generator,
            locks: SubjectLocks::default(),
        }
    }

    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    pub async fn get(&self, subject_id: i64) -> Result<Option<Summary>, SummaryError> {
        Ok(summaries::load_summary(&self.db, subject_id).await?)
    }

    pub async fn state(&self, subject_id: i64) -> Result<SummaryState, SummaryError> {
        Ok(SummaryState::of(self.get(subject_id).await?.as_ref()))
    }

    /// Absent → Draft
    pub async fn create(&self, subject_id: i64) -> Result<Summary, SummaryError> {
        let _guard = self.locks.acquire(subject_id).await;

        let subject = self.subject(subject_id).await?;
        if summaries::load_summary(&self.db, subject_id).await?.is_some() {
            return Err(SummaryError::AlreadyExists(subject_id));
        }

        let entries = reviews::entries_for_subject(&self.db, subject_id).await?;
        let generated = self.generator.generate(&subject.name, &entries).await?;

        let summary = summaries::insert_summary(
            &self.db,
            subject_id,
            &generated.content,
            &generated.weighting_explanation,
        )
        .await?;

        tracing::info!(subject_id, entries = entries.len(), "Summary created");
        Ok(summary)
    }

    /// Draft → Draft with manually supplied content
    pub async fn edit(&self, subject_id: i64, content: &str) -> Result<Summary, SummaryError> {
        let _guard = self.locks.acquire(subject_id).await;

        match summaries::load_summary(&self.db, subject_id).await? {
            None => return Err(SummaryError::NotFound(subject_id)),
            Some(existing) if existing.finalised => {
                return Err(SummaryError::Finalised(subject_id))
            }
            Some(_) => {}
        }

        if let GuardedWrite::Locked = summaries::update_content(&self.db, subject_id, content).await? {
            return Err(SummaryError::Finalised(subject_id));
        }

        tracing::info!(subject_id, content_chars = content.len(), "Summary edited");
        self.reload(subject_id).await
    }

    /// Draft → Draft with a fresh generation; creates when absent
    pub async fn regenerate(&self, subject_id: i64) -> Result<Summary, SummaryError> {
        let _guard = self.locks.acquire(subject_id).await;
        self.regenerate_locked(subject_id).await
    }

    /// Draft → Finalised
    pub async fn finalise(&self, subject_id: i64) -> Result<Summary, SummaryError> {
        let _guard = self.locks.acquire(subject_id).await;

        match summaries::load_summary(&self.db, subject_id).await? {
            None => return Err(SummaryError::NotFound(subject_id)),
            Some(existing) if existing.finalised => {
                return Err(SummaryError::AlreadyFinalised(subject_id))
            }
            Some(_) => {}
        }

        if let GuardedWrite::Locked = summaries::mark_finalised(&self.db, subject_id).await? {
            return Err(SummaryError::AlreadyFinalised(subject_id));
        }

        tracing::info!(subject_id, "Summary finalised");
        self.reload(subject_id).await
    }

    pub(crate) async fn lock_subject(&self, subject_id: i64) -> SubjectGuard {
        self.locks.acquire(subject_id).await
    }

    /// Caller must hold the subject's lock.
    ///
    /// The previous draft is replaced only after generation succeeds; a
    /// failed generation leaves it in place.
    pub(crate) async fn regenerate_locked(&self, subject_id: i64) -> Result<Summary, SummaryError> {
        let subject = self.subject(subject_id).await?;

        if let Some(existing) = summaries::load_summary(&self.db, subject_id).await? {
            if existing.finalised {
                return Err(SummaryError::Finalised(subject_id));
            }
        }

        let entries = reviews::entries_for_subject(&self.db, subject_id).await?;
        let generated = self.generator.generate(&subject.name, &entries).await?;

        match summaries::replace_summary(
            &self.db,
            subject_id,
            &generated.content,
            &generated.weighting_explanation,
        )
        .await?
        {
            GuardedWrite::Applied(summary) => {
                tracing::info!(subject_id, entries = entries.len(), "Summary regenerated");
                Ok(summary)
            }
            GuardedWrite::Locked => Err(SummaryError::Finalised(subject_id)),
        }
    }

    async fn subject(&self, subject_id: i64) -> Result<Subject, SummaryError> {
        subjects::get_subject(&self.db, subject_id)
            .await?
            .ok_or(SummaryError::SubjectNotFound(subject_id))
    }

    async fn reload(&self, subject_id: i64) -> Result<Summary, SummaryError> {
        summaries::load_summary(&self.db, subject_id)
            .await?
            .ok_or(SummaryError::NotFound(subject_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_subject_is_serialized() {
        let locks = SubjectLocks::default();
        let guard = locks.acquire(1).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire(1).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_subjects_do_not_block() {
        let locks = SubjectLocks::default();
        let _first = locks.acquire(1).await;

        tokio::time::timeout(Duration::from_secs(1), locks.acquire(2))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_released_locks_are_pruned() {
        let locks = SubjectLocks::default();
        for subject_id in 0..100 {
            let _g = locks.acquire(subject_id).await;
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_entry_survives_while_contended() {
        let locks = SubjectLocks::default();
        let guard = locks.acquire(7).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.acquire(7).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        drop(guard);
        assert_eq!(locks.len(), 1, "waiter still refers to the entry");

        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
        assert!(locks.is_empty());
    }
}
