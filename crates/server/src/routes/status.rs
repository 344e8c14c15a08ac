// crates/server/src/routes/status.rs
//! GET /api/status/{job_id} — snapshot of one job.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use docsmith_types::{JobId, JobRecord};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Return the current record for a job. A malformed id is reported the same
/// way as an unknown one, so callers cannot probe the id format.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Arc<JobRecord>>> {
    let id: JobId = job_id
        .parse()
        .map_err(|_| ApiError::JobNotFound(job_id.clone()))?;
    let record = state.tracker.status(id)?;
    Ok(Json(record))
}
