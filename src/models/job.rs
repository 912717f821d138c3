use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::models::verification::ValidationOutcome;

/// Status of a batch verification job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    /// `done` and `failed` are terminal.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    /// Allowed moves: pending -> running, running -> done | failed.
    /// A job may also fail straight out of pending when its input never
    /// reaches the runner.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Pending, JobStatus::Failed)
                | (JobStatus::Running, JobStatus::Done)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

/// Which optional checks run for every address of a job.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Deep reachability probing through the remote SMTP probe service.
    pub smtp_check: bool,
    /// Identity lookup (gravatar).
    pub gravatar_check: bool,
    /// Treat domains that accept all addresses as such during deep probing.
    pub catch_all_check: bool,
}

/// A batch verification job.
///
/// `results` is positional: slot `i` belongs to input address `i` and stays
/// `None` until that address has been verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub results: Vec<Option<ValidationOutcome>>,
    pub created_at: DateTime<Utc>,
    pub options: ValidationOptions,
    pub progress: usize,
    pub total: usize,
}

impl Job {
    /// A fresh `pending` job with `total` empty result slots.
    pub fn new(id: String, options: ValidationOptions, total: usize) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            results: vec![None; total],
            created_at: Utc::now(),
            options,
            progress: 0,
            total,
        }
    }

    pub fn progress_view(&self) -> JobProgress {
        JobProgress {
            progress: self.progress,
            total: self.total,
            status: self.status,
        }
    }
}

/// Lightweight polling view of a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobProgress {
    pub progress: usize,
    pub total: usize,
    pub status: JobStatus,
}
