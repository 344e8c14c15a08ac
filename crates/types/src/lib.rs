// crates/types/src/lib.rs
//! Shared data types for docsmith.
//!
//! Pure data — no async, no I/O. Everything here is consumed by the job
//! tracker (`docsmith-jobs`), the collaborators (`docsmith-core`), and the
//! HTTP surface (`docsmith-server`).

pub mod job;

pub use job::{JobId, JobPhase, JobRecord, JobStatus};
