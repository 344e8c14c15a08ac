// crates/core/src/render.rs
//! Rendering: convert a generated document into the requested target format.

use async_trait::async_trait;

use crate::error::CollaboratorError;
use crate::generate::Document;
use crate::request::DocStyle;

/// A rendered artifact, ready to write to disk.
#[derive(Debug, Clone)]
pub struct RenderedDoc {
    pub content: String,
    pub extension: &'static str,
}

/// Renders a document body into a target markup format.
#[async_trait]
pub trait DocRenderer: Send + Sync {
    async fn render(&self, doc: &Document, style: DocStyle) -> Result<RenderedDoc, CollaboratorError>;
}

/// Built-in renderer: markdown passthrough, minimal HTML wrapping, JSON dump.
#[derive(Debug, Default)]
pub struct TemplateRenderer;

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[async_trait]
impl DocRenderer for TemplateRenderer {
    async fn render(&self, doc: &Document, style: DocStyle) -> Result<RenderedDoc, CollaboratorError> {
        let content = match style {
            DocStyle::Markdown => doc.body.clone(),
            DocStyle::Html => format!(
                "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n<pre>{}</pre>\n</body>\n</html>\n",
                escape_html(&doc.title),
                escape_html(&doc.body),
            ),
            DocStyle::Json => serde_json::to_string_pretty(doc)
                .map_err(|e| CollaboratorError::Render(e.to_string()))?,
        };
        Ok(RenderedDoc {
            content,
            extension: style.extension(),
        })
    }
}
