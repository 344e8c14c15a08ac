// crates/core/src/generate.rs
//! Document generation: turn parsed outlines into a document body.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CollaboratorError;
use crate::parse::FileOutline;

/// A generated document body, style-agnostic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub title: String,
    /// Markdown body text.
    pub body: String,
    /// Model identifier the generator attributed the content to.
    pub model: String,
    pub files_documented: usize,
}

/// Produces a document body from file outlines.
///
/// The built-in `OutlineGenerator` assembles deterministic markdown. A real
/// LLM-backed generator would implement this same trait — the `model` field
/// of the descriptor is passed through opaquely for that purpose.
#[async_trait]
pub trait DocGenerator: Send + Sync {
    async fn generate(
        &self,
        outlines: &[FileOutline],
        model: &str,
        include_metrics: bool,
    ) -> Result<Document, CollaboratorError>;
}

/// Built-in generator: deterministic markdown straight from the outlines.
#[derive(Debug, Default)]
pub struct OutlineGenerator;

#[async_trait]
impl DocGenerator for OutlineGenerator {
    async fn generate(
        &self,
        outlines: &[FileOutline],
        model: &str,
        include_metrics: bool,
    ) -> Result<Document, CollaboratorError> {
        let mut body = String::new();
        body.push_str("# Code Documentation\n\n");

        if outlines.is_empty() {
            body.push_str("No source files matched the requested patterns.\n");
        } else {
            body.push_str(&format!("Covers {} source files.\n\n", outlines.len()));

            for outline in outlines {
                body.push_str(&format!(
                    "## `{}` ({})\n\n",
                    outline.path.display(),
                    outline.language
                ));
                if let Some(summary) = &outline.summary {
                    body.push_str(&format!("{summary}\n\n"));
                }
                if outline.items.is_empty() {
                    body.push_str("_No top-level declarations found._\n\n");
                } else {
                    for item in &outline.items {
                        body.push_str(&format!("- `{item}`\n"));
                    }
                    body.push('\n');
                }
                if include_metrics {
                    if let Some(stats) = &outline.stats {
                        body.push_str(&format!(
                            "{} lines ({} code, {} comment, {} blank)\n\n",
                            stats.total_lines,
                            stats.code_lines,
                            stats.comment_lines,
                            stats.blank_lines
                        ));
                    }
                }
            }
        }

        tracing::debug!(files = outlines.len(), model = %model, "document generated");
        Ok(Document {
            title: "Code Documentation".to_string(),
            body,
            model: model.to_string(),
            files_documented: outlines.len(),
        })
    }
}
