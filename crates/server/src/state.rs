// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use docsmith_jobs::JobTracker;

use crate::pipeline::DocPipeline;

/// Shared application state accessible from all route handlers.
///
/// The tracker and pipeline are injected here rather than living in globals,
/// so tests can build a state around fakes and a scratch output directory.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Job tracker owning the lifecycle of every documentation job.
    pub tracker: Arc<JobTracker>,
    /// Collaborator bundle that executes one documentation job.
    pub pipeline: Arc<DocPipeline>,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(pipeline: DocPipeline) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            tracker: Arc::new(JobTracker::new()),
            pipeline: Arc::new(pipeline),
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
