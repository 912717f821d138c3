use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::models::job::{JobStatus, ValidationOptions};
use crate::models::verification::ValidationOutcome;
use crate::services::store::JobEntry;
use crate::services::verifier::{Verifier, VerifyError};

/// Drives every address of a job through the verifier with at most
/// `max_in_flight` calls outstanding, then settles the job status.
pub struct BatchRunner {
    verifier: Arc<dyn Verifier>,
    max_in_flight: usize,
}

impl BatchRunner {
    pub fn new(verifier: Arc<dyn Verifier>, max_in_flight: usize) -> Self {
        Self {
            verifier,
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Run the job to a terminal state and return that state.
    ///
    /// `addresses` must line up with the job's result slots; the options are
    /// taken from the stored job. Outcomes land in the slot matching each
    /// address's input position, so completion order never affects result
    /// order. The job is `done` only after every dispatched call has finished
    /// and every slot is filled; a list shorter than the job's total leaves
    /// slots empty and fails the job, a longer one fails it before dispatch.
    pub async fn run(&self, entry: JobEntry, addresses: Vec<String>) -> JobStatus {
        let job = entry.snapshot().await;
        let job_id = job.id;
        let options = job.options;
        let started = Instant::now();

        if addresses.is_empty() {
            tracing::warn!(job_id = %job_id, "Job reached runner without addresses");
            return self.settle(&entry, &job_id, JobStatus::Failed, started).await;
        }

        if addresses.len() > job.total {
            tracing::error!(
                job_id = %job_id,
                total = job.total,
                received = addresses.len(),
                "More addresses than result slots"
            );
            return self.settle(&entry, &job_id, JobStatus::Failed, started).await;
        }

        if let Err(e) = entry.transition(JobStatus::Running).await {
            tracing::error!(job_id = %job_id, error = %e, "Job could not start");
            return entry.snapshot().await.status;
        }

        tracing::info!(
            job_id = %job_id,
            total = addresses.len(),
            max_in_flight = self.max_in_flight,
            "Job running"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let mut workers = JoinSet::new();

        for (index, email) in addresses.into_iter().enumerate() {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let verifier = Arc::clone(&self.verifier);
            let worker_entry = entry.clone();
            workers.spawn(async move {
                let _permit = permit;
                metrics::gauge!("email_verifications_in_flight").increment(1.0);
                let outcome = verify_one(verifier.as_ref(), &email, &options).await;
                metrics::gauge!("email_verifications_in_flight").decrement(1.0);
                metrics::counter!(
                    "email_verifications_total",
                    "reachable" => outcome.reachable.to_string()
                )
                .increment(1);
                if let Err(e) = worker_entry.record(index, outcome).await {
                    tracing::error!(index, error = %e, "Failed to record outcome");
                }
            });

            while let Some(result) = workers.try_join_next() {
                if let Err(error) = result {
                    tracing::error!(job_id = %job_id, "verification worker crashed: {error}");
                }
            }
        }

        while let Some(result) = workers.join_next().await {
            if let Err(error) = result {
                tracing::error!(job_id = %job_id, "verification worker crashed: {error}");
            }
        }

        let missing = entry.missing().await;
        let status = if missing == 0 {
            JobStatus::Done
        } else {
            tracing::error!(job_id = %job_id, missing, "Job finished with unrecorded results");
            JobStatus::Failed
        };
        self.settle(&entry, &job_id, status, started).await
    }

    async fn settle(
        &self,
        entry: &JobEntry,
        job_id: &str,
        status: JobStatus,
        started: Instant,
    ) -> JobStatus {
        if let Err(e) = entry.transition(status).await {
            tracing::error!(job_id = %job_id, error = %e, "Ignoring job status change");
            return entry.snapshot().await.status;
        }

        let elapsed = started.elapsed();
        metrics::histogram!("email_batch_job_seconds").record(elapsed.as_secs_f64());
        match status {
            JobStatus::Done => metrics::counter!("email_batch_jobs_completed_total").increment(1),
            JobStatus::Failed => metrics::counter!("email_batch_jobs_failed_total").increment(1),
            _ => {}
        }

        tracing::info!(
            job_id = %job_id,
            status = %status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Job finished"
        );
        status
    }
}

/// One verification call. Errors and panics become error outcomes so that a
/// single bad address never takes down its siblings.
async fn verify_one(
    verifier: &dyn Verifier,
    email: &str,
    options: &ValidationOptions,
) -> ValidationOutcome {
    let result = AssertUnwindSafe(verifier.verify(email, options))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(VerifyError::Panicked(panic_message(payload.as_ref()))));

    match result {
        Ok(verdict) => verdict.into_outcome(email),
        Err(e) => {
            tracing::debug!(email, error = %e, "Verification failed");
            ValidationOutcome::failed(email, e.to_string())
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
