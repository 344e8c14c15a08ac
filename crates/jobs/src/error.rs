// crates/jobs/src/error.rs
use thiserror::Error;

use docsmith_types::{JobId, JobStatus};

/// Errors from the tracker's read/cancel/fetch surface.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Job not found: {0}")]
    NotFound(JobId),

    /// Result requested before the job produced one. Covers failed and
    /// cancelled jobs too: a result was never produced.
    #[error("Job {0} has no result yet (status: {1})")]
    NotReady(JobId, JobStatus),

    #[error("Result artifact for job {0} is missing from its backing store")]
    ResultMissing(JobId),

    #[error("Job {0} is already {1}")]
    InvalidState(JobId, JobStatus),
}
