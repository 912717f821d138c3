//! In-memory registry of batch jobs.
//!
//! Each job lives behind its own lock so pollers of one job never contend
//! with the workers of another. Readers always receive a clone taken under
//! the job's read lock, so progress and results are never observed torn.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::job::{Job, JobProgress, JobStatus};
use crate::models::verification::ValidationOutcome;

/// Registry of jobs keyed by id. Created once per process and shared by
/// `Arc`; there is no delete.
#[derive(Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<String, JobEntry>>,
}

/// Counts reported by the health endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub tracked: usize,
    pub running: usize,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job and hand back the writable entry for its runner.
    pub async fn create(&self, job: Job) -> Result<JobEntry, StoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(StoreError::DuplicateId(job.id));
        }
        let id = job.id.clone();
        let entry = JobEntry {
            job: Arc::new(RwLock::new(job)),
        };
        jobs.insert(id, entry.clone());
        Ok(entry)
    }

    /// Snapshot of the full job record.
    pub async fn get(&self, id: &str) -> Option<Job> {
        let entry = self.entry(id).await?;
        let job = entry.job.read().await;
        Some(job.clone())
    }

    /// Progress view taken from the same record as [`JobStore::get`].
    pub async fn progress(&self, id: &str) -> Option<JobProgress> {
        let entry = self.entry(id).await?;
        let job = entry.job.read().await;
        Some(job.progress_view())
    }

    pub async fn stats(&self) -> StoreStats {
        let entries: Vec<JobEntry> = self.jobs.read().await.values().cloned().collect();
        let mut stats = StoreStats {
            tracked: entries.len(),
            running: 0,
        };
        for entry in entries {
            if entry.job.read().await.status == JobStatus::Running {
                stats.running += 1;
            }
        }
        stats
    }

    async fn entry(&self, id: &str) -> Option<JobEntry> {
        self.jobs.read().await.get(id).cloned()
    }
}

/// Shared handle onto one stored job; the only path through which a job is
/// mutated after creation.
#[derive(Debug, Clone)]
pub struct JobEntry {
    job: Arc<RwLock<Job>>,
}

impl JobEntry {
    pub async fn id(&self) -> String {
        self.job.read().await.id.clone()
    }

    pub async fn snapshot(&self) -> Job {
        self.job.read().await.clone()
    }

    /// Move the job to `next` if the state machine allows it.
    pub(crate) async fn transition(&self, next: JobStatus) -> Result<(), RecordError> {
        let mut job = self.job.write().await;
        if !job.status.can_transition_to(next) {
            return Err(RecordError::Transition {
                from: job.status,
                to: next,
            });
        }
        job.status = next;
        Ok(())
    }

    /// Store the outcome for input position `index` and bump progress.
    /// Returns the new progress value.
    pub(crate) async fn record(
        &self,
        index: usize,
        outcome: ValidationOutcome,
    ) -> Result<usize, RecordError> {
        let mut job = self.job.write().await;
        if job.status != JobStatus::Running {
            return Err(RecordError::NotRunning(job.status));
        }
        let total = job.total;
        let slot = job
            .results
            .get_mut(index)
            .ok_or(RecordError::OutOfRange { index, total })?;
        if slot.is_some() {
            return Err(RecordError::AlreadyRecorded(index));
        }
        *slot = Some(outcome);
        job.progress += 1;
        Ok(job.progress)
    }

    /// Number of result slots still empty.
    pub(crate) async fn missing(&self) -> usize {
        self.job
            .read()
            .await
            .results
            .iter()
            .filter(|slot| slot.is_none())
            .count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("job id already exists: {0}")]
    DuplicateId(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("cannot move job from {from} to {to}")]
    Transition { from: JobStatus, to: JobStatus },

    #[error("job is {0}, not running")]
    NotRunning(JobStatus),

    #[error("result index {index} out of range for {total} addresses")]
    OutOfRange { index: usize, total: usize },

    #[error("result {0} already recorded")]
    AlreadyRecorded(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::ValidationOptions;
    use crate::models::verification::Reachability;

    fn job(id: &str, total: usize) -> Job {
        Job::new(id.to_string(), ValidationOptions::default(), total)
    }

    fn outcome(email: &str) -> ValidationOutcome {
        ValidationOutcome {
            email: email.to_string(),
            reachable: Reachability::Unknown,
            error: None,
            gravatar: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = JobStore::new();
        tokio_test::assert_ok!(store.create(job("j1", 2)).await);

        let fetched = store.get("j1").await.unwrap();
        assert_eq!(fetched.id, "j1");
        assert_eq!(fetched.total, 2);
        assert_eq!(fetched.status, JobStatus::Pending);
        assert!(store.get("missing").await.is_none());
        assert!(store.progress("missing").await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = JobStore::new();
        store.create(job("j1", 1)).await.unwrap();
        let err = tokio_test::assert_err!(store.create(job("j1", 5)).await);
        assert!(matches!(err, StoreError::DuplicateId(id) if id == "j1"));
        // Original record untouched.
        assert_eq!(store.get("j1").await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_record_requires_running() {
        let store = JobStore::new();
        let entry = store.create(job("j1", 1)).await.unwrap();
        let err = entry.record(0, outcome("a@x.com")).await.unwrap_err();
        assert_eq!(err, RecordError::NotRunning(JobStatus::Pending));
    }

    #[tokio::test]
    async fn test_record_is_positional_and_single_shot() {
        let store = JobStore::new();
        let entry = store.create(job("j1", 2)).await.unwrap();
        entry.transition(JobStatus::Running).await.unwrap();

        assert_eq!(entry.record(1, outcome("b@x.com")).await.unwrap(), 1);
        assert_eq!(
            entry.record(1, outcome("b@x.com")).await.unwrap_err(),
            RecordError::AlreadyRecorded(1)
        );
        assert_eq!(
            entry.record(2, outcome("c@x.com")).await.unwrap_err(),
            RecordError::OutOfRange { index: 2, total: 2 }
        );

        let snapshot = store.get("j1").await.unwrap();
        assert_eq!(snapshot.progress, 1);
        assert!(snapshot.results[0].is_none());
        assert_eq!(snapshot.results[1].as_ref().unwrap().email, "b@x.com");
        assert_eq!(entry.missing().await, 1);
    }

    #[tokio::test]
    async fn test_terminal_state_is_final() {
        let store = JobStore::new();
        let entry = store.create(job("j1", 0)).await.unwrap();
        entry.transition(JobStatus::Running).await.unwrap();
        entry.transition(JobStatus::Done).await.unwrap();
        assert!(entry.transition(JobStatus::Failed).await.is_err());
        assert!(entry.transition(JobStatus::Running).await.is_err());
        assert_eq!(store.progress("j1").await.unwrap().status, JobStatus::Done);
    }

    #[tokio::test]
    async fn test_stats_counts_running() {
        let store = JobStore::new();
        let a = store.create(job("a", 1)).await.unwrap();
        store.create(job("b", 1)).await.unwrap();
        a.transition(JobStatus::Running).await.unwrap();
        assert_eq!(
            store.stats().await,
            StoreStats {
                tracked: 2,
                running: 1
            }
        );
    }
}
