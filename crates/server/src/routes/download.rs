// crates/server/src/routes/download.rs
//! GET /api/download/{job_id} — stream the finished artifact.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use docsmith_types::JobId;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "md" => "text/markdown; charset=utf-8",
        "html" => "text/html; charset=utf-8",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Serve the artifact of a completed job as an attachment. Jobs that are not
/// completed map to 400 via `NotReady`; a record whose file has vanished from
/// disk maps to 404 via `ResultMissing`.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Response> {
    let id: JobId = job_id
        .parse()
        .map_err(|_| ApiError::JobNotFound(job_id.clone()))?;

    let path = state.tracker.fetch_result(id).await?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to read artifact: {e}")))?;

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("bin");
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("documentation");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(extension).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
