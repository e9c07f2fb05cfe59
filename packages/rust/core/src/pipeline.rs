//! The content enrichment pipeline.
//!
//! Five ordered stages, each a potential halt point, no branching or
//! loops back:
//!
//! `SelectSource → DiscoverReferences → AcquireExcerpts → Rewrite → Persist`
//!
//! Each stage's output is the next stage's input. A stage that yields
//! nothing halts the run for this invocation — the run ends with a
//! [`RunReport::Halted`] naming the stage, never with a raised error.
//! The source article is left untouched and eligible for re-selection
//! on a subsequent run.

use tracing::{info, instrument, warn};

use articleforge_acquisition::PageReader;
use articleforge_discovery::ReferenceFinder;
use articleforge_rewrite::{RewriteResult, Rewriter};
use articleforge_shared::{
    Article, ArticlePayload, Result, RuntimeConfig, StageOutcome, types::SOURCE_URL_SENTINEL,
};
use articleforge_storage::ArticleStore;

// ---------------------------------------------------------------------------
// Stage / RunReport
// ---------------------------------------------------------------------------

/// The ordered pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SelectSource,
    DiscoverReferences,
    AcquireExcerpts,
    Rewrite,
    Persist,
}

impl Stage {
    /// Stable name used in logs and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelectSource => "select-source",
            Self::DiscoverReferences => "discover-references",
            Self::AcquireExcerpts => "acquire-excerpts",
            Self::Rewrite => "rewrite",
            Self::Persist => "persist",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    /// A generated article was persisted.
    Completed {
        /// Storage-assigned id of the generated article.
        article_id: i64,
        /// Title of the generated article.
        title: String,
    },
    /// The run halted at a stage without persisting anything.
    Halted {
        /// The stage that halted the run.
        stage: Stage,
        /// Human-readable reason for diagnostics.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a stage.
    fn stage(&self, stage: Stage);
    /// Called when the run completes or halts.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn stage(&self, _stage: Stage) {}
    fn done(&self, _report: &RunReport) {}
}

// ---------------------------------------------------------------------------
// EnrichPipeline
// ---------------------------------------------------------------------------

/// The assembled pipeline: storage client plus the three stage components.
pub struct EnrichPipeline {
    store: ArticleStore,
    finder: ReferenceFinder,
    reader: PageReader,
    rewriter: Rewriter,
}

impl EnrichPipeline {
    /// Build all components from the resolved runtime configuration.
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            store: ArticleStore::new(config)?,
            finder: ReferenceFinder::new(config)?,
            reader: PageReader::new(config)?,
            rewriter: Rewriter::new(config)?,
        })
    }

    /// Run one enrichment pass.
    ///
    /// Always returns a report; provider failures and empty stages are
    /// halts, not errors. Only configuration problems fail earlier, at
    /// construction time.
    #[instrument(skip_all)]
    pub async fn run(&self, progress: &dyn ProgressReporter) -> RunReport {
        // --- Stage 1: SelectSource ---
        progress.stage(Stage::SelectSource);
        let article = match self.select_source().await {
            StageOutcome::Ready(article) => article,
            StageOutcome::Empty => {
                return self.halt(progress, Stage::SelectSource, "no original articles to enrich");
            }
            StageOutcome::Failed(reason) => {
                return self.halt(progress, Stage::SelectSource, &reason);
            }
        };
        info!(id = article.id, title = %article.title, "source article selected");

        // --- Stage 2: DiscoverReferences ---
        progress.stage(Stage::DiscoverReferences);
        let links = match self.finder.discover(&article.title).await {
            StageOutcome::Ready(links) => links,
            StageOutcome::Empty => {
                return self.halt(progress, Stage::DiscoverReferences, "no reference links found");
            }
            StageOutcome::Failed(reason) => {
                return self.halt(progress, Stage::DiscoverReferences, &reason);
            }
        };

        // --- Stage 3: AcquireExcerpts ---
        progress.stage(Stage::AcquireExcerpts);
        let excerpts = match self.acquire_excerpts(&links).await {
            StageOutcome::Ready(excerpts) => excerpts,
            StageOutcome::Empty => {
                return self.halt(
                    progress,
                    Stage::AcquireExcerpts,
                    "no reference page yielded any text",
                );
            }
            StageOutcome::Failed(reason) => {
                return self.halt(progress, Stage::AcquireExcerpts, &reason);
            }
        };
        info!(
            acquired = excerpts.len(),
            discovered = links.len(),
            "reference excerpts acquired"
        );

        // --- Stage 4: Rewrite ---
        progress.stage(Stage::Rewrite);
        let Some(rewritten) = self.rewriter.rewrite(&article, &excerpts).await else {
            return self.halt(progress, Stage::Rewrite, "model produced no usable rewrite");
        };

        // --- Stage 5: Persist ---
        progress.stage(Stage::Persist);
        let payload = build_payload(&article, &rewritten, &links);
        match self.store.create(&payload).await {
            Ok(created) => {
                info!(id = created.id, title = %created.title, "generated article persisted");
                let report = RunReport::Completed {
                    article_id: created.id,
                    title: created.title,
                };
                progress.done(&report);
                report
            }
            // No retry: the source stays unenriched and is re-selected
            // on the next invocation.
            Err(e) => self.halt(progress, Stage::Persist, &e.to_string()),
        }
    }

    /// Pick the first non-generated article from the newest-first list.
    ///
    /// Nothing marks articles whose previous runs halted partway; such
    /// an article is simply selected again on the next invocation.
    async fn select_source(&self) -> StageOutcome<Article> {
        match self.store.list().await {
            Ok(articles) => match articles.into_iter().find(|a| !a.is_generated) {
                Some(article) => StageOutcome::Ready(article),
                None => StageOutcome::Empty,
            },
            Err(e) => StageOutcome::Failed(e.to_string()),
        }
    }

    /// Fetch each discovered URL one at a time, keeping non-empty
    /// excerpts only. The link count is at most two, so concurrency
    /// buys nothing here.
    async fn acquire_excerpts(&self, links: &[String]) -> StageOutcome<Vec<String>> {
        let mut excerpts = Vec::with_capacity(links.len());

        for link in links {
            let excerpt = self.reader.read_excerpt(link).await;
            if !excerpt.is_empty() {
                excerpts.push(excerpt);
            }
        }

        if excerpts.is_empty() {
            StageOutcome::Empty
        } else {
            StageOutcome::Ready(excerpts)
        }
    }

    fn halt(&self, progress: &dyn ProgressReporter, stage: Stage, reason: &str) -> RunReport {
        warn!(%stage, reason, "pipeline halted");
        let report = RunReport::Halted {
            stage,
            reason: reason.to_string(),
        };
        progress.done(&report);
        report
    }
}

// ---------------------------------------------------------------------------
// Payload assembly
// ---------------------------------------------------------------------------

/// Build the create payload for the generated article.
///
/// The relational link back to the original is established by the
/// storage layer's own semantics, not here.
fn build_payload(original: &Article, rewritten: &RewriteResult, links: &[String]) -> ArticlePayload {
    ArticlePayload {
        title: rewritten.title.clone(),
        content: assemble_content(&rewritten.body, links),
        source_url: Some(
            original
                .source_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| SOURCE_URL_SENTINEL.to_string()),
        ),
        is_generated: true,
        references: Some(links.to_vec()),
        original_article_id: None,
    }
}

/// Append a numbered "References" section after the rewritten body.
fn assemble_content(body: &str, links: &[String]) -> String {
    if links.is_empty() {
        return body.to_string();
    }

    let mut content = String::from(body);
    content.push_str("\n\n---\n### References: \n");
    for (i, link) in links.iter().enumerate() {
        content.push_str(&format!("{}. [Link]({link})\n", i + 1));
    }
    content
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
