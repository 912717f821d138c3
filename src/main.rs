use std::process::ExitCode;
use std::sync::Arc;

use email_batch_verify::{
    app_state::AppState,
    config::AppConfig,
    routes,
    services::{
        jobs::JobService, runner::BatchRunner, store::JobStore, verifier::EmailVerifier,
    },
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server terminated");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    tracing::info!("Initializing email-batch-verify server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = Arc::new(PrometheusBuilder::new().install_recorder()?);

    metrics::describe_counter!(
        "email_batch_jobs_submitted_total",
        "Total batch jobs submitted"
    );
    metrics::describe_counter!(
        "email_batch_jobs_completed_total",
        "Total batch jobs that reached done"
    );
    metrics::describe_counter!(
        "email_batch_jobs_failed_total",
        "Total batch jobs that reached failed"
    );
    metrics::describe_counter!(
        "email_verifications_total",
        "Per-address verifications by reachability verdict"
    );
    metrics::describe_gauge!(
        "email_verifications_in_flight",
        "Verification calls currently in flight"
    );
    metrics::describe_histogram!(
        "email_batch_job_seconds",
        "Wall time from job start to terminal state"
    );

    if config.reachability_api_url.is_none() {
        tracing::warn!("REACHABILITY_API_URL not set; deep checks will be reported as errors");
    }

    let verifier = EmailVerifier::from_config(&config)?.into_shared();
    let runner = BatchRunner::new(verifier, config.max_concurrency);
    let jobs = JobService::new(Arc::new(JobStore::new()), runner);
    let state = AppState::new(jobs);

    let app = routes::router(state, Some(prometheus_handle), config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        max_concurrency = config.max_concurrency,
        "Server listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
