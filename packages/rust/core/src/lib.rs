//! Pipeline orchestration for ArticleForge.
//!
//! One invocation enriches at most one article:
//! select source → discover references → acquire excerpts → rewrite → persist.

pub mod pipeline;

pub use pipeline::{EnrichPipeline, ProgressReporter, RunReport, SilentProgress, Stage};
