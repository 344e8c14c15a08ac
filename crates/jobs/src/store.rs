// crates/jobs/src/store.rs
//! Snapshot-replace table of job records.
//!
//! Records are stored as `Arc<JobRecord>` and never mutated in place: a
//! transition builds a full replacement record and swaps the `Arc` under the
//! write lock. Readers clone the `Arc` and can hold the snapshot for as long
//! as they like without observing a torn write.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use docsmith_types::{JobId, JobRecord};

/// Aggregate counts for the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobCounts {
    pub total: usize,
    /// Jobs in a non-terminal state.
    pub active: usize,
}

/// Process-wide job table. Dependency-injected into every consumer — never a
/// global.
pub struct JobStore {
    jobs: RwLock<HashMap<JobId, Arc<JobRecord>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, record: JobRecord) -> Arc<JobRecord> {
        let record = Arc::new(record);
        match self.jobs.write() {
            Ok(mut jobs) => {
                jobs.insert(record.id, Arc::clone(&record));
            }
            Err(e) => tracing::error!("RwLock poisoned inserting job: {e}"),
        }
        record
    }

    /// Current snapshot of one job.
    pub fn get(&self, id: JobId) -> Option<Arc<JobRecord>> {
        match self.jobs.read() {
            Ok(jobs) => jobs.get(&id).map(Arc::clone),
            Err(e) => {
                tracing::error!("RwLock poisoned reading job: {e}");
                None
            }
        }
    }

    /// Atomic read-modify-replace. `f` sees the current record and returns
    /// the replacement, or `None` to leave the record untouched (the
    /// terminal-wins rule lives in the closures callers pass in).
    ///
    /// Returns the record now in the table, or `None` for unknown ids.
    pub fn update<F>(&self, id: JobId, f: F) -> Option<Arc<JobRecord>>
    where
        F: FnOnce(&JobRecord) -> Option<JobRecord>,
    {
        match self.jobs.write() {
            Ok(mut jobs) => {
                let current = Arc::clone(jobs.get(&id)?);
                match f(&current) {
                    Some(replacement) => {
                        let replacement = Arc::new(replacement);
                        jobs.insert(id, Arc::clone(&replacement));
                        Some(replacement)
                    }
                    None => Some(current),
                }
            }
            Err(e) => {
                tracing::error!("RwLock poisoned updating job: {e}");
                None
            }
        }
    }

    /// Snapshots of all jobs, unordered.
    pub fn all(&self) -> Vec<Arc<JobRecord>> {
        match self.jobs.read() {
            Ok(jobs) => jobs.values().map(Arc::clone).collect(),
            Err(e) => {
                tracing::error!("RwLock poisoned listing jobs: {e}");
                Vec::new()
            }
        }
    }

    /// Snapshots of all non-terminal jobs.
    pub fn active(&self) -> Vec<Arc<JobRecord>> {
        self.all().into_iter().filter(|r| !r.is_terminal()).collect()
    }

    pub fn counts(&self) -> JobCounts {
        let all = self.all();
        let active = all.iter().filter(|r| !r.is_terminal()).count();
        JobCounts {
            total: all.len(),
            active,
        }
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}
