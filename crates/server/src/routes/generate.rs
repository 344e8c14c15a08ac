// crates/server/src/routes/generate.rs
//! POST /api/generate — accept a documentation request and start a job.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use docsmith_core::DocRequest;
use docsmith_types::{JobId, JobStatus};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub job_id: JobId,
    pub status: JobStatus,
    pub message: String,
}

/// Validate the request, register a job, and return 202 with the job id.
/// The handler never waits on the pipeline; failures past validation are
/// reported through the job record, not this response.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DocRequest>,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    request
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let pipeline = Arc::clone(&state.pipeline);
    let job_id = state
        .tracker
        .submit("Documentation job queued", move |ctx| async move {
            pipeline.run(&ctx, request).await
        });

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            job_id,
            status: JobStatus::Queued,
            message: "Documentation job queued".to_string(),
        }),
    ))
}
