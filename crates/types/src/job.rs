// crates/types/src/job.rs
//! Job lifecycle types.
//!
//! A `JobRecord` is an immutable snapshot: every transition builds a complete
//! replacement record, so a terminal record can never be observed half-written
//! (`status == completed` always comes with `result` set, `failed` with
//! `error` set).

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a job. Opaque, assigned at creation, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Allocate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Status of a job.
///
/// `Completed`, `Failed`, and `Cancelled` are terminal: a record in one of
/// those states never transitions again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Cancelling,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Cancelling => "cancelling",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational progress label within `Running`. Not a true state — purely
/// descriptive, mirrors the phase sequence of the documentation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Fetching,
    Scanning,
    Parsing,
    Generating,
    Rendering,
}

impl JobPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Scanning => "scanning",
            Self::Parsing => "parsing",
            Self::Generating => "generating",
            Self::Rendering => "rendering",
        }
    }
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One snapshot of a job's visible state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize))]
pub struct JobRecord {
    pub id: JobId,
    pub status: JobStatus,
    /// Only meaningful while running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<JobPhase>,
    /// In [0, 100]; monotonically non-decreasing while the job is live.
    pub progress: f32,
    /// Human-readable description of the current step.
    pub message: String,
    /// Set iff `status == Completed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PathBuf>,
    /// Set iff `status == Failed` (or the cancel note for `Cancelled`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every transition; doubles as the worker heartbeat.
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    /// Fresh record in `Queued` state.
    pub fn queued(id: JobId, message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Queued,
            phase: None,
            progress: 0.0,
            message: message.into(),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replacement record for a phase advance. Progress is clamped so it
    /// never moves backwards.
    pub fn advanced(&self, phase: JobPhase, progress: f32, message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Running,
            phase: Some(phase),
            progress: progress.clamp(self.progress, 100.0),
            message: message.into(),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Terminal replacement record: success with an artifact reference.
    pub fn completed(&self, result: PathBuf, message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Completed,
            phase: None,
            progress: 100.0,
            message: message.into(),
            result: Some(result),
            error: None,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Terminal replacement record: failure with a cause.
    pub fn failed(&self, error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            phase: None,
            message: "job failed".to_string(),
            result: None,
            error: Some(error.into()),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Replacement record acknowledging a cancel request.
    pub fn cancelling(&self) -> Self {
        Self {
            status: JobStatus::Cancelling,
            message: "cancellation requested".to_string(),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Terminal replacement record after the worker observed cancellation.
    pub fn cancelled(&self, note: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Cancelled,
            phase: None,
            message: "job cancelled".to_string(),
            result: None,
            error: Some(note.into()),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
