use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use email_batch_verify::{
    config::AppConfig,
    models::job::{JobStatus, ValidationOptions},
    services::{
        jobs::JobService, runner::BatchRunner, store::JobStore, verifier::EmailVerifier,
    },
};
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

const POLL_INTERVAL_MS: u64 = 500;

#[derive(Parser, Debug)]
#[command(about = "Verify every address in a local CSV file and print the job as JSON")]
struct Args {
    /// CSV file to read addresses from.
    file: PathBuf,
    /// Probe deliverability through the reachability service.
    #[arg(long)]
    smtp_check: bool,
    /// Look up a gravatar for each address.
    #[arg(long)]
    gravatar_check: bool,
    /// Report catch-all domains during deep checks.
    #[arg(long)]
    catch_all_check: bool,
    /// Override MAX_CONCURRENCY.
    #[arg(long)]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the result document.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(JobStatus::Done) => ExitCode::SUCCESS,
        Ok(status) => {
            tracing::warn!(status = %status, "Job did not complete");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Batch run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<JobStatus, Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let data = tokio::fs::read(&args.file).await?;

    let options = ValidationOptions {
        smtp_check: args.smtp_check,
        gravatar_check: args.gravatar_check,
        catch_all_check: args.catch_all_check,
    };

    let verifier = EmailVerifier::from_config(&config)?.into_shared();
    let runner = BatchRunner::new(verifier, args.concurrency.unwrap_or(config.max_concurrency));
    let jobs = JobService::new(Arc::new(JobStore::new()), runner);

    let job_id = jobs.submit_csv(&data, options).await?.id;
    tracing::info!(job_id = %job_id, file = %args.file.display(), "Batch submitted");

    let mut last_progress = 0;
    let status = loop {
        let progress = jobs.get_progress(&job_id).await?;
        if progress.progress != last_progress {
            tracing::info!(
                job_id = %job_id,
                progress = progress.progress,
                total = progress.total,
                "Batch progress"
            );
            last_progress = progress.progress;
        }
        if progress.status.is_terminal() {
            break progress.status;
        }
        sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    };

    let job = jobs.get_results(&job_id).await?;
    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(status)
}
