// crates/core/src/request.rs
//! The work descriptor for a documentation job, plus structural validation.
//!
//! Validation is synchronous and happens before any job exists — a malformed
//! descriptor is rejected at the submitting call and never reaches a worker.

use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_file_patterns() -> Vec<String> {
    ["*.py", "*.js", "*.ts", "*.java", "*.cpp", "*.go", "*.rs"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_exclude_patterns() -> Vec<String> {
    ["node_modules", "__pycache__", ".git", "dist", "build", "target"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_true() -> bool {
    true
}

/// Output style for the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocStyle {
    #[default]
    Markdown,
    Html,
    Json,
}

impl DocStyle {
    /// File extension for the rendered artifact.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

/// A documentation work descriptor.
///
/// Exactly one of `repo_url` / `local_path` must be set. Snake_case aliases
/// are accepted alongside the camelCase wire form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocRequest {
    #[serde(default, alias = "repo_url", skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(default, alias = "local_path", skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(default = "default_file_patterns", alias = "file_patterns")]
    pub file_patterns: Vec<String>,
    #[serde(default = "default_exclude_patterns", alias = "exclude_patterns")]
    pub exclude_patterns: Vec<String>,
    #[serde(default, alias = "doc_style")]
    pub doc_style: DocStyle,
    #[serde(default = "default_true", alias = "include_metrics")]
    pub include_metrics: bool,
    /// Model identifier passed opaquely to the generator collaborator.
    #[serde(default = "default_model", alias = "llm_model")]
    pub model: String,
}

/// Structural validation failure, surfaced synchronously to the submitter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("exactly one of repoUrl or localPath must be provided")]
    AmbiguousSource,

    #[error("either repoUrl or localPath must be provided")]
    MissingSource,

    #[error("filePatterns must not be empty")]
    EmptyFilePatterns,
}

impl DocRequest {
    /// Structural validation: checks shape, not semantics. Whether the source
    /// actually exists is the resolver collaborator's business.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match (&self.repo_url, &self.local_path) {
            (Some(_), Some(_)) => return Err(ValidationError::AmbiguousSource),
            (None, None) => return Err(ValidationError::MissingSource),
            _ => {}
        }
        if self.file_patterns.is_empty() {
            return Err(ValidationError::EmptyFilePatterns);
        }
        Ok(())
    }
}
