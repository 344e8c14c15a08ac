// crates/core/src/parse.rs
//! Per-file parsing: extract a structural outline (declared items plus a
//! leading doc summary) from one source file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use regex_lite::Regex;
use serde::Serialize;

use crate::error::CollaboratorError;
use crate::scan::FileStats;

/// Structured metadata extracted from one file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutline {
    pub path: PathBuf,
    pub language: String,
    /// Declared item signatures, in file order.
    pub items: Vec<String>,
    /// First doc-comment line, if the file starts with one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<FileStats>,
}

/// Parses one file into an outline.
#[async_trait]
pub trait SourceParser: Send + Sync {
    /// `Ok(None)` means the file was skipped (unreadable, unknown language).
    /// Skips are logged, not fatal — mirrors the pipeline's tolerance for
    /// individual bad files.
    async fn parse(
        &self,
        path: &Path,
        include_metrics: bool,
    ) -> Result<Option<FileOutline>, CollaboratorError>;
}

/// Built-in parser: line-oriented signature extraction with `regex-lite`.
///
/// Not a real language frontend — it finds top-level declaration lines per
/// language family, which is all the outline generator needs.
pub struct SignatureParser {
    rust_item: Regex,
    python_item: Regex,
    js_item: Regex,
    go_item: Regex,
    braces_item: Regex,
}

impl Default for SignatureParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Language families the built-in parser recognizes, with the file
/// extensions mapped to each.
const LANGUAGES: &[(&str, &[&str])] = &[
    ("rust", &["rs"]),
    ("python", &["py"]),
    ("javascript", &["js", "jsx"]),
    ("typescript", &["ts", "tsx"]),
    ("go", &["go"]),
    ("java", &["java"]),
    ("c/c++", &["c", "h", "cpp", "hpp", "cc"]),
    ("c#", &["cs"]),
    ("ruby", &["rb"]),
    ("php", &["php"]),
    ("swift", &["swift"]),
    ("kotlin", &["kt"]),
    ("scala", &["scala"]),
    ("shell", &["sh"]),
    ("sql", &["sql"]),
    ("yaml", &["yaml", "yml"]),
    ("json", &["json"]),
];

/// The language/extension table, for surfacing to API clients.
pub fn supported_languages() -> &'static [(&'static str, &'static [&'static str])] {
    LANGUAGES
}

fn language_for(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();
    LANGUAGES
        .iter()
        .find(|(_, exts)| exts.contains(&ext.as_str()))
        .map(|(name, _)| *name)
}

impl SignatureParser {
    pub fn new() -> Self {
        // These are anchored line matchers; regex construction only fails on
        // malformed patterns, which would be a programming error here.
        Self {
            rust_item: Regex::new(
                r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:fn|struct|enum|trait|mod)\s+\w+",
            )
            .expect("valid rust pattern"),
            python_item: Regex::new(r"^\s*(?:async\s+)?(?:def|class)\s+\w+").expect("valid python pattern"),
            js_item: Regex::new(
                r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?(?:function|class|interface)\s+\w+",
            )
            .expect("valid js pattern"),
            go_item: Regex::new(r"^func\s+(?:\([^)]*\)\s*)?\w+").expect("valid go pattern"),
            braces_item: Regex::new(
                r"^\s*(?:public|private|protected|static|final|abstract|\s)*\s*(?:class|interface|enum|void|int|string|String)\s+\w+",
            )
            .expect("valid braces pattern"),
        }
    }

    fn item_regex(&self, language: &str) -> &Regex {
        match language {
            "rust" => &self.rust_item,
            "python" | "ruby" => &self.python_item,
            "javascript" | "typescript" => &self.js_item,
            "go" => &self.go_item,
            _ => &self.braces_item,
        }
    }

    fn leading_summary(content: &str) -> Option<String> {
        let first = content.lines().find(|l| !l.trim().is_empty())?;
        let trimmed = first.trim();
        for prefix in ["//!", "///", "//", "#", "\"\"\"", "/*"] {
            if let Some(rest) = trimmed.strip_prefix(prefix) {
                let rest = rest.trim_start_matches(['*', '!', '"']).trim();
                if !rest.is_empty() {
                    return Some(rest.to_string());
                }
                return None;
            }
        }
        None
    }
}

#[async_trait]
impl SourceParser for SignatureParser {
    async fn parse(
        &self,
        path: &Path,
        include_metrics: bool,
    ) -> Result<Option<FileOutline>, CollaboratorError> {
        let Some(language) = language_for(path) else {
            tracing::debug!(path = %path.display(), "unknown language, skipping");
            return Ok(None);
        };

        let content = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable file, skipping");
                return Ok(None);
            }
        };

        let regex = self.item_regex(language);
        let items: Vec<String> = content
            .lines()
            .filter_map(|line| regex.find(line).map(|m| m.as_str().trim().to_string()))
            .collect();

        Ok(Some(FileOutline {
            path: path.to_path_buf(),
            language: language.to_string(),
            items,
            summary: Self::leading_summary(&content),
            stats: include_metrics.then(|| FileStats::from_content(&content)),
        }))
    }
}
