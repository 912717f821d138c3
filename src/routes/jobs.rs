use axum::extract::{Path, State};
use axum::Json;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::job::{Job, JobProgress};

/// GET /api/progress/{job_id}: Progress counter and status.
pub async fn get_progress(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobProgress>, ApiError> {
    Ok(Json(state.jobs.get_progress(&job_id).await?))
}

/// GET /api/results/{job_id}: Full job record, including partial results.
pub async fn get_results(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    Ok(Json(state.jobs.get_results(&job_id).await?))
}
