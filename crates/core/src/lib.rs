// crates/core/src/lib.rs
//! Collaborator seams and built-in implementations for docsmith.
//!
//! Each phase of a documentation job calls exactly one collaborator:
//! - `SourceResolver` — work descriptor → source root directory
//! - `SourceScanner` — source root → ordered list of code files
//! - `SourceParser` — code file → structural outline
//! - `DocGenerator` — outlines + model id → document body
//! - `DocRenderer` — document body → final artifact text
//!
//! The built-ins are deliberately thin (filesystem walk, regex signature
//! extraction, deterministic markdown). Anything heavyweight — git clones,
//! model inference — lives behind the trait and is supplied by the embedder
//! or faked in tests.

pub mod error;
pub mod generate;
pub mod parse;
pub mod render;
pub mod request;
pub mod resolve;
pub mod scan;

pub use error::CollaboratorError;
pub use generate::{DocGenerator, Document, OutlineGenerator};
pub use parse::{supported_languages, FileOutline, SignatureParser, SourceParser};
pub use render::{DocRenderer, RenderedDoc, TemplateRenderer};
pub use request::{DocRequest, DocStyle, ValidationError};
pub use resolve::{FilesystemResolver, SourceResolver};
pub use scan::{FileStats, SourceScanner, WalkScanner};
