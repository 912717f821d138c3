pub mod health;
pub mod jobs;
pub mod metrics;
pub mod upload;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Build the HTTP router. `/metrics` is mounted only when a Prometheus
/// handle is supplied.
pub fn router(
    state: AppState,
    prometheus: Option<Arc<PrometheusHandle>>,
    max_upload_bytes: usize,
) -> Router {
    let mut app = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/upload", post(upload::submit_upload))
        .route("/api/progress/{job_id}", get(jobs::get_progress))
        .route("/api/results/{job_id}", get(jobs::get_results))
        .with_state(state);

    if let Some(handle) = prometheus {
        app = app.route(
            "/metrics",
            get(metrics::prometheus_metrics).with_state(handle),
        );
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
}
