// crates/core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by collaborators during a documentation phase.
///
/// Phase failures are caught at the phase boundary and committed into the
/// job record; they never propagate as process-level faults.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Source kind not supported by this resolver: {0}")]
    UnsupportedSource(String),

    #[error("Source directory not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Render failed: {0}")]
    Render(String),
}

impl CollaboratorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
