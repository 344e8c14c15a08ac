// crates/core/src/resolve.rs
//! Source resolution: work descriptor → root directory on local disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::CollaboratorError;
use crate::request::DocRequest;

/// Resolves the source named by a work descriptor to a local directory.
///
/// The built-in `FilesystemResolver` only handles `localPath` sources.
/// Remote sources (`repoUrl`) need a clone-capable resolver supplied by the
/// embedder; tests substitute fakes.
#[async_trait]
pub trait SourceResolver: Send + Sync {
    async fn resolve(&self, request: &DocRequest) -> Result<PathBuf, CollaboratorError>;
}

/// Resolver for sources already present on the local filesystem.
#[derive(Debug, Default)]
pub struct FilesystemResolver;

#[async_trait]
impl SourceResolver for FilesystemResolver {
    async fn resolve(&self, request: &DocRequest) -> Result<PathBuf, CollaboratorError> {
        if let Some(url) = &request.repo_url {
            return Err(CollaboratorError::UnsupportedSource(format!(
                "remote repository fetch is not configured (repoUrl: {url})"
            )));
        }
        // Validation guarantees one of the two is set.
        let path = request.local_path.as_deref().unwrap_or(".");
        let root = Path::new(path).to_path_buf();

        let meta = tokio::fs::metadata(&root)
            .await
            .map_err(|_| CollaboratorError::SourceNotFound { path: root.clone() })?;
        if !meta.is_dir() {
            return Err(CollaboratorError::SourceNotFound { path: root });
        }

        tracing::debug!(root = %root.display(), "resolved local source");
        Ok(root)
    }
}
