use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub jobs: JobCounts,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobCounts {
    pub tracked: usize,
    pub running: usize,
}

/// GET /health: liveness plus in-memory job counts.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.jobs.stats().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        jobs: JobCounts {
            tracked: stats.tracked,
            running: stats.running,
        },
    })
}
