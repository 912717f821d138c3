use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::jobs::JobError;

/// Request-level failures. Per-address verification errors never get here;
/// they are recorded in the job's results.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Failed to parse form: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Failed to get file: missing 'file' field")]
    MissingFile,

    #[error(transparent)]
    Job(#[from] JobError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Multipart(_) | ApiError::MissingFile => StatusCode::BAD_REQUEST,
            ApiError::Job(JobError::EmptyInput | JobError::InvalidInput(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Job(JobError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Job(JobError::Store(_) | JobError::Runner(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Job(JobError::NotFound(_)) => "Job not found".to_string(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::StoreError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Job(JobError::EmptyInput).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Job(JobError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Job(JobError::Store(StoreError::DuplicateId("x".into()))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
