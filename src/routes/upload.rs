use axum::extract::{Multipart, State};
use axum::Json;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::job::ValidationOptions;
use crate::models::verification::SubmitResponse;

/// POST /api/upload: Submit a CSV of addresses for batch verification.
///
/// Form fields: `file` (CSV), and `smtp_check`, `gravatar_check`,
/// `catch_all_check`, each enabled only by the exact value `"true"`.
pub async fn submit_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SubmitResponse>, ApiError> {
    let mut file: Option<Vec<u8>> = None;
    let mut options = ValidationOptions::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => file = Some(field.bytes().await?.to_vec()),
            Some("smtp_check") => options.smtp_check = field.text().await? == "true",
            Some("gravatar_check") => options.gravatar_check = field.text().await? == "true",
            Some("catch_all_check") => options.catch_all_check = field.text().await? == "true",
            _ => {}
        }
    }

    let file = file.ok_or(ApiError::MissingFile)?;
    let handle = state.jobs.submit_csv(&file, options).await?;

    Ok(Json(SubmitResponse { job_id: handle.id }))
}
