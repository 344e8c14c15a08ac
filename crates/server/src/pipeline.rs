// crates/server/src/pipeline.rs
//! The documentation pipeline: drives one job through its phases.
//!
//! Phase sequence and progress ranges:
//! fetching 5% → scanning 10–30% → parsing 30–70% → generating 70–90%
//! → rendering 90–100%. Each phase calls exactly one collaborator and
//! commits a progress update at the boundary; cancellation is checked
//! between phases (and between files while parsing).

use std::path::PathBuf;
use std::sync::Arc;

use docsmith_core::{
    CollaboratorError, DocGenerator, DocRenderer, DocRequest, FileOutline, FilesystemResolver,
    OutlineGenerator, SignatureParser, SourceParser, SourceResolver, SourceScanner,
    TemplateRenderer, WalkScanner,
};
use docsmith_jobs::{JobContext, JobOutcome};
use docsmith_types::JobPhase;

/// Collaborator bundle plus the output directory artifacts are written to.
///
/// Every collaborator sits behind its trait so embedders (and tests) can
/// substitute their own — a clone-capable resolver, an LLM-backed generator.
pub struct DocPipeline {
    resolver: Arc<dyn SourceResolver>,
    scanner: Arc<dyn SourceScanner>,
    parser: Arc<dyn SourceParser>,
    generator: Arc<dyn DocGenerator>,
    renderer: Arc<dyn DocRenderer>,
    output_dir: PathBuf,
}

impl DocPipeline {
    /// Pipeline with the built-in collaborators.
    pub fn with_defaults(output_dir: PathBuf) -> Self {
        Self {
            resolver: Arc::new(FilesystemResolver),
            scanner: Arc::new(WalkScanner),
            parser: Arc::new(SignatureParser::new()),
            generator: Arc::new(OutlineGenerator),
            renderer: Arc::new(TemplateRenderer),
            output_dir,
        }
    }

    /// Replace the source resolver (e.g. with a clone-capable one).
    pub fn with_resolver(mut self, resolver: Arc<dyn SourceResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the document generator (e.g. with an LLM-backed one).
    pub fn with_generator(mut self, generator: Arc<dyn DocGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Execute one documentation job. Collaborator failures bubble up as
    /// `CollaboratorError` and settle the job as failed; an observed cancel
    /// request returns `JobOutcome::Cancelled`.
    pub async fn run(
        &self,
        ctx: &JobContext,
        request: DocRequest,
    ) -> Result<JobOutcome, CollaboratorError> {
        if ctx.is_cancelled() {
            return Ok(JobOutcome::Cancelled);
        }
        ctx.advance(JobPhase::Fetching, 5.0, "Resolving source...");
        let root = self.resolver.resolve(&request).await?;

        if ctx.is_cancelled() {
            return Ok(JobOutcome::Cancelled);
        }
        ctx.advance(JobPhase::Scanning, 10.0, "Scanning codebase...");
        let files = self
            .scanner
            .scan(&root, &request.file_patterns, &request.exclude_patterns)
            .await?;
        ctx.advance(
            JobPhase::Scanning,
            30.0,
            format!("Found {} files to document", files.len()),
        );

        let mut outlines: Vec<FileOutline> = Vec::with_capacity(files.len());
        for (i, file) in files.iter().enumerate() {
            if ctx.is_cancelled() {
                return Ok(JobOutcome::Cancelled);
            }
            if let Some(outline) = self.parser.parse(file, request.include_metrics).await? {
                outlines.push(outline);
            }
            let progress = 30.0 + 40.0 * (i + 1) as f32 / files.len() as f32;
            ctx.advance(
                JobPhase::Parsing,
                progress,
                format!("Parsed {}/{} files", i + 1, files.len()),
            );
        }

        if ctx.is_cancelled() {
            return Ok(JobOutcome::Cancelled);
        }
        ctx.advance(JobPhase::Generating, 70.0, "Generating documentation...");
        let document = self
            .generator
            .generate(&outlines, &request.model, request.include_metrics)
            .await?;

        if ctx.is_cancelled() {
            return Ok(JobOutcome::Cancelled);
        }
        ctx.advance(JobPhase::Rendering, 90.0, "Saving documentation...");
        let rendered = self.renderer.render(&document, request.doc_style).await?;

        let job_dir = self.output_dir.join(ctx.id().to_string());
        tokio::fs::create_dir_all(&job_dir)
            .await
            .map_err(|e| CollaboratorError::io(job_dir.clone(), e))?;
        let artifact = job_dir.join(format!("documentation.{}", rendered.extension));
        tokio::fs::write(&artifact, rendered.content)
            .await
            .map_err(|e| CollaboratorError::io(artifact.clone(), e))?;

        tracing::info!(job_id = %ctx.id(), artifact = %artifact.display(), "documentation written");
        Ok(JobOutcome::Completed(artifact))
    }
}
