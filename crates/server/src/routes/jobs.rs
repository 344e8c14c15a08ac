// crates/server/src/routes/jobs.rs
//! Job administration: listing, live streaming, cancellation.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::Serialize;
use tokio_stream::Stream;

use docsmith_types::{JobId, JobRecord, JobStatus};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/jobs — snapshots of every non-terminal job.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Arc<JobRecord>>> {
    Json(state.tracker.active_jobs())
}

/// GET /api/jobs/stream — SSE feed of active jobs, one event per second.
///
/// Each event carries the full active-job array; clients diff on their end.
/// The stream runs until the client disconnects.
pub async fn stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let tracker = Arc::clone(&state.tracker);

    let stream = async_stream::stream! {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        loop {
            interval.tick().await;
            let jobs = tracker.active_jobs();
            match serde_json::to_string(&jobs) {
                Ok(json) => yield Ok(Event::default().event("jobs").data(json)),
                Err(e) => {
                    tracing::error!("Failed to serialize job snapshots: {e}");
                }
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub job_id: JobId,
    pub status: JobStatus,
}

/// POST /api/jobs/{job_id}/cancel — request cooperative cancellation.
///
/// Returns the record as of the request: `cancelling` until the worker
/// acknowledges. Terminal jobs are rejected with 409.
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<CancelResponse>> {
    let id: JobId = job_id
        .parse()
        .map_err(|_| ApiError::JobNotFound(job_id.clone()))?;
    let record = state.tracker.cancel(id)?;
    Ok(Json(CancelResponse {
        job_id: id,
        status: record.status,
    }))
}
