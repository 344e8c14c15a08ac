// crates/jobs/src/tracker.rs
//! Central tracker that spawns and supervises background jobs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tokio_util::sync::CancellationToken;

use docsmith_types::{JobId, JobPhase, JobRecord, JobStatus};

use crate::error::TrackerError;
use crate::store::{JobCounts, JobStore};

/// Explicit worker outcome: either an artifact was produced, or the worker
/// stopped because it observed a cancel request.
#[derive(Debug)]
pub enum JobOutcome {
    Completed(PathBuf),
    Cancelled,
}

/// Handle a worker uses to report progress for its own job.
///
/// Each job has exactly one context, owned by its worker task — the single
/// writer for that record while the job is live.
#[derive(Clone)]
pub struct JobContext {
    id: JobId,
    store: Arc<JobStore>,
    cancel: CancellationToken,
}

impl JobContext {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Record a phase boundary: phase label, progress, message, heartbeat.
    ///
    /// No-op once the record is terminal or a cancel has been acknowledged,
    /// so a straggling worker can never resurrect a settled job.
    pub fn advance(&self, phase: JobPhase, progress: f32, message: impl Into<String>) {
        let message = message.into();
        self.store.update(self.id, |current| {
            if current.is_terminal() || current.status == JobStatus::Cancelling {
                return None;
            }
            Some(current.advanced(phase, progress, message))
        });
    }

    /// Cooperative cancellation check, consulted between phases.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Owns the job table plus one cancellation token per live job.
///
/// `submit` spawns the worker and returns immediately; everything else is a
/// non-blocking read or an atomic record swap.
pub struct JobTracker {
    store: Arc<JobStore>,
    cancels: RwLock<HashMap<JobId, CancellationToken>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self {
            store: Arc::new(JobStore::new()),
            cancels: RwLock::new(HashMap::new()),
        }
    }

    /// Submit a unit of work. Allocates a fresh id, registers a `Queued`
    /// record, spawns the worker, and returns without waiting on it.
    ///
    /// The worker receives a `JobContext` for progress reporting and returns
    /// `Ok(JobOutcome)` or an error; the tracker commits the terminal record
    /// in a single swap either way.
    pub fn submit<F, Fut, E>(&self, message: impl Into<String>, work: F) -> JobId
    where
        F: FnOnce(JobContext) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<JobOutcome, E>> + Send + 'static,
        E: std::fmt::Display,
    {
        let id = JobId::new();
        self.store.insert(JobRecord::queued(id, message));

        let token = CancellationToken::new();
        match self.cancels.write() {
            Ok(mut cancels) => {
                cancels.insert(id, token.clone());
            }
            Err(e) => tracing::error!("RwLock poisoned registering cancel token: {e}"),
        }

        let ctx = JobContext {
            id,
            store: Arc::clone(&self.store),
            cancel: token,
        };
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let outcome = work(ctx).await;
            // Terminal commit: one atomic swap, and terminal-wins — if the
            // reaper already failed this job, the late commit is dropped.
            store.update(id, |current| {
                if current.is_terminal() {
                    tracing::warn!(job_id = %id, status = %current.status, "dropping late terminal commit");
                    return None;
                }
                Some(match &outcome {
                    Ok(JobOutcome::Completed(path)) => {
                        tracing::info!(job_id = %id, result = %path.display(), "job completed");
                        current.completed(path.clone(), "completed successfully")
                    }
                    Ok(JobOutcome::Cancelled) => {
                        tracing::info!(job_id = %id, "job cancelled");
                        current.cancelled("cancelled by request")
                    }
                    Err(e) => {
                        tracing::warn!(job_id = %id, error = %e, "job failed");
                        current.failed(e.to_string())
                    }
                })
            });
        });

        tracing::info!(job_id = %id, "job submitted");
        id
    }

    /// Current snapshot of a job. Never blocks on the worker.
    pub fn status(&self, id: JobId) -> Result<Arc<JobRecord>, TrackerError> {
        self.store.get(id).ok_or(TrackerError::NotFound(id))
    }

    /// Path to the produced artifact, verified to still exist on disk.
    pub async fn fetch_result(&self, id: JobId) -> Result<PathBuf, TrackerError> {
        let record = self.status(id)?;
        if record.status != JobStatus::Completed {
            return Err(TrackerError::NotReady(id, record.status));
        }
        // Set by construction for completed records.
        let path = record
            .result
            .clone()
            .ok_or(TrackerError::ResultMissing(id))?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            _ => Err(TrackerError::ResultMissing(id)),
        }
    }

    /// Request cancellation. Flips the record to `Cancelling` and fires the
    /// token; the worker observes it at its next check and settles the job
    /// as `Cancelled`. Idempotent while cancelling; rejected once terminal.
    pub fn cancel(&self, id: JobId) -> Result<Arc<JobRecord>, TrackerError> {
        let current = self.status(id)?;
        if current.is_terminal() {
            return Err(TrackerError::InvalidState(id, current.status));
        }

        let updated = self
            .store
            .update(id, |cur| {
                if cur.is_terminal() || cur.status == JobStatus::Cancelling {
                    return None;
                }
                Some(cur.cancelling())
            })
            .ok_or(TrackerError::NotFound(id))?;

        match self.cancels.read() {
            Ok(cancels) => {
                if let Some(token) = cancels.get(&id) {
                    token.cancel();
                }
            }
            Err(e) => tracing::error!("RwLock poisoned firing cancel token: {e}"),
        }

        tracing::info!(job_id = %id, "cancellation requested");
        Ok(updated)
    }

    /// Orphan recovery: mark every non-terminal job whose heartbeat
    /// (`updated_at`) is older than `max_idle` as failed. Returns the number
    /// of jobs reaped.
    pub fn reap_stalled(&self, max_idle: chrono::Duration) -> usize {
        let cutoff = chrono::Utc::now() - max_idle;
        let mut reaped = 0;
        for record in self.store.all() {
            if record.is_terminal() || record.updated_at > cutoff {
                continue;
            }
            let mut applied = false;
            self.store.update(record.id, |current| {
                // Re-check under the lock; the worker may have just committed.
                if current.is_terminal() || current.updated_at > cutoff {
                    return None;
                }
                applied = true;
                Some(current.failed(format!(
                    "worker heartbeat timeout: no progress for over {}s",
                    max_idle.num_seconds()
                )))
            });
            if applied {
                tracing::warn!(job_id = %record.id, "reaped stalled job");
                reaped += 1;
            }
        }
        reaped
    }

    /// Snapshots of all non-terminal jobs.
    pub fn active_jobs(&self) -> Vec<Arc<JobRecord>> {
        self.store.active()
    }

    /// Aggregate counts for the health endpoint.
    pub fn counts(&self) -> JobCounts {
        self.store.counts()
    }
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Convenience worker error for tests.
    #[derive(Debug)]
    struct WorkError(String);

    impl std::fmt::Display for WorkError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    async fn wait_for_terminal(tracker: &JobTracker, id: JobId) -> Arc<JobRecord> {
        for _ in 0..100 {
            let rec = tracker.status(id).unwrap();
            if rec.is_terminal() {
                return rec;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job never reached a terminal state");
    }

    #[tokio::test]
    async fn test_submit_returns_immediately_with_live_status() {
        let tracker = JobTracker::new();
        let id = tracker.submit("queued", |ctx| async move {
            ctx.advance(JobPhase::Scanning, 10.0, "scanning");
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out/doc.md")))
        });

        let rec = tracker.status(id).unwrap();
        assert!(matches!(rec.status, JobStatus::Queued | JobStatus::Running));
        assert!(rec.progress < 100.0);
    }

    #[tokio::test]
    async fn test_submit_ids_are_unique() {
        let tracker = JobTracker::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..50 {
            let id = tracker.submit("queued", |_ctx| async move {
                Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out")))
            });
            assert!(seen.insert(id));
        }
    }

    #[tokio::test]
    async fn test_completed_job_has_result_and_full_progress() {
        let tracker = JobTracker::new();
        let id = tracker.submit("queued", |ctx| async move {
            ctx.advance(JobPhase::Generating, 70.0, "generating");
            Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out/doc.md")))
        });

        let rec = wait_for_terminal(&tracker, id).await;
        assert_eq!(rec.status, JobStatus::Completed);
        assert_eq!(rec.progress, 100.0);
        assert_eq!(rec.result, Some(PathBuf::from("/out/doc.md")));
        assert!(rec.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_job_has_error_and_no_result() {
        let tracker = JobTracker::new();
        let id = tracker.submit("queued", |_ctx| async move {
            Err::<JobOutcome, _>(WorkError("collaborator exploded".into()))
        });

        let rec = wait_for_terminal(&tracker, id).await;
        assert_eq!(rec.status, JobStatus::Failed);
        assert_eq!(rec.error.as_deref(), Some("collaborator exploded"));
        assert!(rec.result.is_none());
    }

    #[tokio::test]
    async fn test_status_unknown_id_is_not_found() {
        let tracker = JobTracker::new();
        let err = tracker.status(JobId::new()).unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_result_before_completion_is_not_ready() {
        let tracker = JobTracker::new();
        let id = tracker.submit("queued", |_ctx| async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out")))
        });

        let err = tracker.fetch_result(id).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotReady(_, _)));
    }

    #[tokio::test]
    async fn test_fetch_result_on_failed_job_is_not_ready() {
        let tracker = JobTracker::new();
        let id = tracker.submit("queued", |_ctx| async move {
            Err::<JobOutcome, _>(WorkError("boom".into()))
        });
        wait_for_terminal(&tracker, id).await;

        let err = tracker.fetch_result(id).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotReady(_, JobStatus::Failed)));
    }

    #[tokio::test]
    async fn test_fetch_result_roundtrips_artifact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("doc.md");

        let tracker = JobTracker::new();
        let path_for_worker = artifact.clone();
        let id = tracker.submit("queued", |_ctx| async move {
            tokio::fs::write(&path_for_worker, b"# generated")
                .await
                .map_err(|e| WorkError(e.to_string()))?;
            Ok::<_, WorkError>(JobOutcome::Completed(path_for_worker))
        });
        wait_for_terminal(&tracker, id).await;

        let path = tracker.fetch_result(id).await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"# generated");
    }

    #[tokio::test]
    async fn test_fetch_result_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("doc.md");
        std::fs::write(&artifact, "content").unwrap();

        let tracker = JobTracker::new();
        let path_for_worker = artifact.clone();
        let id = tracker.submit("queued", |_ctx| async move {
            Ok::<_, WorkError>(JobOutcome::Completed(path_for_worker))
        });
        wait_for_terminal(&tracker, id).await;

        std::fs::remove_file(&artifact).unwrap();
        let err = tracker.fetch_result(id).await.unwrap_err();
        assert!(matches!(err, TrackerError::ResultMissing(_)));
    }

    #[tokio::test]
    async fn test_cancel_flows_through_cancelling_to_cancelled() {
        let tracker = JobTracker::new();
        let id = tracker.submit("queued", |ctx| async move {
            ctx.advance(JobPhase::Parsing, 40.0, "parsing");
            loop {
                if ctx.is_cancelled() {
                    return Ok::<_, WorkError>(JobOutcome::Cancelled);
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        // Let the worker start.
        tokio::time::sleep(Duration::from_millis(20)).await;

        let rec = tracker.cancel(id).unwrap();
        assert_eq!(rec.status, JobStatus::Cancelling);

        let rec = wait_for_terminal(&tracker, id).await;
        assert_eq!(rec.status, JobStatus::Cancelled);
        assert!(rec.result.is_none());
    }

    #[tokio::test]
    async fn test_cancel_unknown_and_terminal() {
        let tracker = JobTracker::new();
        assert!(matches!(
            tracker.cancel(JobId::new()).unwrap_err(),
            TrackerError::NotFound(_)
        ));

        let id = tracker.submit("queued", |_ctx| async move {
            Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out")))
        });
        wait_for_terminal(&tracker, id).await;

        assert!(matches!(
            tracker.cancel(id).unwrap_err(),
            TrackerError::InvalidState(_, JobStatus::Completed)
        ));
    }

    #[tokio::test]
    async fn test_advance_after_cancelling_is_dropped() {
        let tracker = JobTracker::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let id = tracker.submit("queued", |ctx| async move {
            ctx.advance(JobPhase::Scanning, 10.0, "scanning");
            let _ = rx.await;
            // This update must not clobber the cancelling status.
            ctx.advance(JobPhase::Parsing, 50.0, "late update");
            Ok::<_, WorkError>(JobOutcome::Cancelled)
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        tracker.cancel(id).unwrap();
        tx.send(()).unwrap();

        let rec = wait_for_terminal(&tracker, id).await;
        assert_eq!(rec.status, JobStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_reap_stalled_fails_idle_jobs() {
        let tracker = JobTracker::new();
        let id = tracker.submit("queued", |_ctx| async move {
            // Worker that never reports progress.
            std::future::pending::<()>().await;
            Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out")))
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        let reaped = tracker.reap_stalled(chrono::Duration::zero());
        assert_eq!(reaped, 1);

        let rec = tracker.status(id).unwrap();
        assert_eq!(rec.status, JobStatus::Failed);
        assert!(rec.error.as_deref().unwrap().contains("heartbeat timeout"));
    }

    #[tokio::test]
    async fn test_reap_spares_fresh_and_terminal_jobs() {
        let tracker = JobTracker::new();
        let done = tracker.submit("queued", |_ctx| async move {
            Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out")))
        });
        wait_for_terminal(&tracker, done).await;

        let live = tracker.submit("queued", |ctx| async move {
            loop {
                ctx.advance(JobPhase::Parsing, 50.0, "busy");
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            #[allow(unreachable_code)]
            Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out")))
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let reaped = tracker.reap_stalled(chrono::Duration::seconds(60));
        assert_eq!(reaped, 0);
        assert_eq!(tracker.status(done).unwrap().status, JobStatus::Completed);
        assert_eq!(tracker.status(live).unwrap().status, JobStatus::Running);
    }

    #[tokio::test]
    async fn test_late_completion_does_not_resurrect_reaped_job() {
        let tracker = JobTracker::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let id = tracker.submit("queued", |_ctx| async move {
            let _ = rx.await;
            Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out")))
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(tracker.reap_stalled(chrono::Duration::zero()), 1);

        // Worker finishes after the reaper settled the job.
        tx.send(()).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let rec = tracker.status(id).unwrap();
        assert_eq!(rec.status, JobStatus::Failed);
        assert!(rec.result.is_none());
    }

    #[tokio::test]
    async fn test_reap_count_matches_replacements() {
        let tracker = JobTracker::new();
        for _ in 0..3 {
            tracker.submit("queued", |_ctx| async move {
                std::future::pending::<()>().await;
                Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out")))
            });
        }
        let done = tracker.submit("queued", |_ctx| async move {
            Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out")))
        });
        wait_for_terminal(&tracker, done).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Only the jobs the reaper itself settled are counted; the job that
        // reached a terminal state on its own is not.
        assert_eq!(tracker.reap_stalled(chrono::Duration::zero()), 3);
        assert_eq!(tracker.reap_stalled(chrono::Duration::zero()), 0);
    }

    #[tokio::test]
    async fn test_pollers_never_see_torn_terminal_state() {
        let tracker = Arc::new(JobTracker::new());
        let id = tracker.submit("queued", |ctx| async move {
            for i in 0..20u8 {
                ctx.advance(JobPhase::Parsing, 30.0 + f32::from(i), "parsing");
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out/doc.md")))
        });

        let poller = {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move {
                loop {
                    let rec = tracker.status(id).unwrap();
                    match rec.status {
                        JobStatus::Completed => {
                            assert!(rec.result.is_some(), "completed without result");
                            assert!(rec.error.is_none());
                            break;
                        }
                        JobStatus::Failed => {
                            assert!(rec.error.is_some(), "failed without error");
                            break;
                        }
                        _ => {
                            assert!(rec.result.is_none());
                            assert!(rec.error.is_none());
                        }
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        poller.await.unwrap();
    }

    #[tokio::test]
    async fn test_counts() {
        let tracker = JobTracker::new();
        assert_eq!(tracker.counts(), JobCounts { total: 0, active: 0 });

        let done = tracker.submit("queued", |_ctx| async move {
            Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out")))
        });
        wait_for_terminal(&tracker, done).await;
        let _live = tracker.submit("queued", |_ctx| async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, WorkError>(JobOutcome::Completed(PathBuf::from("/out")))
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(tracker.counts(), JobCounts { total: 2, active: 1 });
        assert_eq!(tracker.active_jobs().len(), 1);
    }
}
