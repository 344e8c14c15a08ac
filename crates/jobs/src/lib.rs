// crates/jobs/src/lib.rs
//! Job tracking for long-running background work.
//!
//! Provides:
//! - `JobStore` — snapshot-replace table of job records
//! - `JobTracker` — submit/status/cancel/fetch-result surface
//! - `JobContext` — handle a worker uses to report progress
//! - `JobOutcome` — explicit success/cancel signal from a worker
//!
//! Every transition builds a complete replacement `JobRecord` and swaps it
//! into the table under one lock, so pollers always see a coherent snapshot:
//! a completed record always carries its result, a failed record its error.

pub mod error;
pub mod store;
pub mod tracker;

pub use error::TrackerError;
pub use store::{JobCounts, JobStore};
pub use tracker::{JobContext, JobOutcome, JobTracker};
