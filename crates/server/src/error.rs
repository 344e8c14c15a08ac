// crates/server/src/error.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use docsmith_jobs::TrackerError;

/// Structured JSON error response for API errors
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// API error types that map to HTTP status codes
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Result not ready: {0}")]
    NotReady(String),

    #[error("Result missing: {0}")]
    ResultMissing(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<TrackerError> for ApiError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::NotFound(id) => Self::JobNotFound(id.to_string()),
            TrackerError::NotReady(..) => Self::NotReady(err.to_string()),
            TrackerError::ResultMissing(id) => Self::ResultMissing(id.to_string()),
            TrackerError::InvalidState(..) => Self::Conflict(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            ApiError::Validation(msg) => {
                tracing::warn!(message = %msg, "Validation error");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Validation error", msg.clone()),
                )
            }
            ApiError::JobNotFound(id) => {
                tracing::warn!(job_id = %id, "Job not found");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details("Job not found", format!("Job ID: {}", id)),
                )
            }
            ApiError::NotReady(msg) => {
                tracing::warn!(message = %msg, "Result not ready");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::with_details("Result not ready", msg.clone()),
                )
            }
            ApiError::ResultMissing(id) => {
                tracing::error!(job_id = %id, "Result artifact missing");
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::with_details(
                        "Result artifact missing",
                        format!("Job ID: {}", id),
                    ),
                )
            }
            ApiError::Conflict(msg) => {
                tracing::warn!(message = %msg, "Conflict");
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::with_details("Conflict", msg.clone()),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(message = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error"),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use docsmith_types::{JobId, JobStatus};

    /// Helper to extract status code and body from a response
    async fn extract_response(response: Response) -> (StatusCode, ErrorResponse) {
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error_response: ErrorResponse = serde_json::from_slice(&body).unwrap();
        (status, error_response)
    }

    #[tokio::test]
    async fn test_validation_returns_400() {
        let error = ApiError::Validation("missing source".to_string());
        let (status, body) = extract_response(error.into_response()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Validation error");
        assert!(body.details.unwrap().contains("missing source"));
    }

    #[tokio::test]
    async fn test_job_not_found_returns_404() {
        let error = ApiError::JobNotFound("abc123".to_string());
        let (status, body) = extract_response(error.into_response()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Job not found");
        assert!(body.details.unwrap().contains("abc123"));
    }

    #[tokio::test]
    async fn test_not_ready_returns_400() {
        let id = JobId::new();
        let error: ApiError = TrackerError::NotReady(id, JobStatus::Running).into();
        let (status, body) = extract_response(error.into_response()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Result not ready");
        assert!(body.details.unwrap().contains("running"));
    }

    #[tokio::test]
    async fn test_result_missing_returns_404() {
        let id = JobId::new();
        let error: ApiError = TrackerError::ResultMissing(id).into();
        let (status, body) = extract_response(error.into_response()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Result artifact missing");
    }

    #[tokio::test]
    async fn test_conflict_returns_409() {
        let id = JobId::new();
        let error: ApiError = TrackerError::InvalidState(id, JobStatus::Completed).into();
        let (status, body) = extract_response(error.into_response()).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error, "Conflict");
        assert!(body.details.unwrap().contains("completed"));
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let error = ApiError::Internal("disk exploded".to_string());
        let (status, body) = extract_response(error.into_response()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
        // Internal errors should NOT expose details to clients
        assert!(body.details.is_none());
    }

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse::new("Test error");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"error\":\"Test error\""));
        assert!(!json.contains("details")); // None should be skipped

        let response = ErrorResponse::with_details("Test error", "More info");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"details\":\"More info\""));
    }

    #[test]
    fn test_tracker_not_found_maps_to_job_not_found() {
        let id = JobId::new();
        let api_err: ApiError = TrackerError::NotFound(id).into();
        assert!(matches!(api_err, ApiError::JobNotFound(_)));
    }
}
