// crates/core/src/scan.rs
//! Source scanning: walk a directory tree and pick out the code files a
//! documentation job should cover.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::CollaboratorError;

/// File extensions the built-in scanner considers code.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "java", "cpp", "c", "h", "hpp", "cs", "go", "rs", "rb", "php",
    "swift", "kt", "scala", "sql", "sh", "yaml", "yml", "json",
];

/// Per-file line statistics, reported in the generated document when the
/// descriptor asks for metrics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
}

impl FileStats {
    /// Count line categories in file content. Comment detection is the crude
    /// line-prefix kind — good enough for summary metrics.
    pub fn from_content(content: &str) -> Self {
        let mut stats = Self {
            total_lines: 0,
            code_lines: 0,
            comment_lines: 0,
            blank_lines: 0,
        };
        for line in content.lines() {
            stats.total_lines += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                stats.blank_lines += 1;
            } else if trimmed.starts_with('#') || trimmed.starts_with("//") {
                stats.comment_lines += 1;
            } else {
                stats.code_lines += 1;
            }
        }
        stats
    }
}

/// Lists the code files under a source root.
#[async_trait]
pub trait SourceScanner: Send + Sync {
    /// Returns matching files in sorted order.
    async fn scan(
        &self,
        root: &Path,
        file_patterns: &[String],
        exclude_patterns: &[String],
    ) -> Result<Vec<PathBuf>, CollaboratorError>;
}

/// Built-in scanner: `walkdir` traversal with glob-style name matching,
/// component-level directory exclusion, and a supported-extension filter.
#[derive(Debug, Default)]
pub struct WalkScanner;

/// Match a file name against a glob pattern supporting `*` and `?`.
fn glob_match(name: &str, pattern: &str) -> bool {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            c if ".+()[]{}^$|\\".contains(c) => {
                regex.push('\\');
                regex.push(c);
            }
            c => regex.push(c),
        }
    }
    regex.push('$');
    regex_lite::Regex::new(&regex)
        .map(|re| re.is_match(name))
        .unwrap_or(false)
}

fn matches_any(name: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| glob_match(name, p))
}

/// True when any path component (or the file name itself) matches an exclude
/// pattern.
fn is_excluded(path: &Path, exclude_patterns: &[String]) -> bool {
    path.components().any(|c| {
        let part = c.as_os_str().to_string_lossy();
        matches_any(&part, exclude_patterns)
    })
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[async_trait]
impl SourceScanner for WalkScanner {
    async fn scan(
        &self,
        root: &Path,
        file_patterns: &[String],
        exclude_patterns: &[String],
    ) -> Result<Vec<PathBuf>, CollaboratorError> {
        let root = root.to_path_buf();
        let file_patterns = file_patterns.to_vec();
        let exclude_patterns = exclude_patterns.to_vec();

        // The walk is blocking filesystem work; keep it off the event loop.
        let files = tokio::task::spawn_blocking(move || {
            let mut files: Vec<PathBuf> = WalkDir::new(&root)
                .follow_links(false)
                .into_iter()
                .filter_entry(|e| {
                    // Prune excluded directories instead of walking into them.
                    if e.file_type().is_dir() && e.depth() > 0 {
                        let name = e.file_name().to_string_lossy();
                        return !matches_any(&name, &exclude_patterns);
                    }
                    true
                })
                .filter_map(|entry| entry.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| {
                    let name = p
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    matches_any(&name, &file_patterns)
                        && !is_excluded(p, &exclude_patterns)
                        && has_supported_extension(p)
                })
                .collect();
            files.sort();
            files
        })
        .await
        .map_err(|e| {
            CollaboratorError::io(
                PathBuf::new(),
                std::io::Error::other(format!("scan task panicked: {e}")),
            )
        })?;

        tracing::info!(count = files.len(), "scan complete");
        Ok(files)
    }
}
