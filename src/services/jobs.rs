use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::models::job::{Job, JobProgress, JobStatus, ValidationOptions};
use crate::services::csv_source::{self, CsvSourceError};
use crate::services::runner::BatchRunner;
use crate::services::store::{JobStore, StoreError, StoreStats};

/// Creates batch jobs and serves read-only views of them.
pub struct JobService {
    store: Arc<JobStore>,
    runner: Arc<BatchRunner>,
}

/// Returned by [`JobService::submit`]. Dropping it detaches the run; the job
/// keeps going in the background.
pub struct JobHandle {
    pub id: String,
    task: JoinHandle<JobStatus>,
}

impl JobHandle {
    /// Wait for the run to reach a terminal state.
    pub async fn wait(self) -> Result<JobStatus, JobError> {
        self.task
            .await
            .map_err(|e| JobError::Runner(e.to_string()))
    }
}

impl JobService {
    pub fn new(store: Arc<JobStore>, runner: BatchRunner) -> Self {
        Self {
            store,
            runner: Arc::new(runner),
        }
    }

    /// Register a `pending` job for `addresses` and start it in the
    /// background. Returns as soon as the job is registered.
    pub async fn submit(
        &self,
        addresses: Vec<String>,
        options: ValidationOptions,
    ) -> Result<JobHandle, JobError> {
        if addresses.is_empty() {
            return Err(JobError::EmptyInput);
        }

        let id = Uuid::now_v7().to_string();
        let total = addresses.len();
        let entry = self.store.create(Job::new(id.clone(), options, total)).await?;

        metrics::counter!("email_batch_jobs_submitted_total").increment(1);
        tracing::info!(
            job_id = %id,
            total,
            smtp_check = options.smtp_check,
            gravatar_check = options.gravatar_check,
            catch_all_check = options.catch_all_check,
            "Job submitted"
        );

        let runner = Arc::clone(&self.runner);
        let task = tokio::spawn(async move { runner.run(entry, addresses).await });

        Ok(JobHandle { id, task })
    }

    /// Extract addresses from CSV bytes and submit them as one job.
    pub async fn submit_csv(
        &self,
        data: &[u8],
        options: ValidationOptions,
    ) -> Result<JobHandle, JobError> {
        let addresses = csv_source::parse_addresses(data)?;
        self.submit(addresses, options).await
    }

    pub async fn get_results(&self, id: &str) -> Result<Job, JobError> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    pub async fn get_progress(&self, id: &str) -> Result<JobProgress, JobError> {
        self.store
            .progress(id)
            .await
            .ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    pub async fn stats(&self) -> StoreStats {
        self.store.stats().await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("No emails found in CSV")]
    EmptyInput,

    #[error("Invalid CSV: {0}")]
    InvalidInput(#[from] CsvSourceError),

    #[error("Job not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("job runner stopped: {0}")]
    Runner(String),
}
