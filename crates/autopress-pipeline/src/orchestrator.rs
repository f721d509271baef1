//! Pipeline orchestrator
//!
//! Walks the work-item queue strictly in order, one item fully processed
//! before the next: draft the article, generate the cover under the retry
//! policy, publish through the session, record the identifier, clean up
//! the cover artifact, then honor the inter-publish delay the portal's
//! abuse controls expect.
//!
//! Per-item failures never abort the loop; only session setup (browser
//! launch, login) is fatal to the run.

use autopress_ai::{Article, ArticleWriter, CoverStudio, ImageGenerator, TextGenerator};
use autopress_browser::Driver;
use autopress_core::{CoverArtifact, CoverMode, Result, RetryPolicy, WorkItem};
use autopress_publisher::{markdown_to_html, PublishSession};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::archive;
use crate::queue::filter_unpublished;
use crate::records::PublishedRecordStore;

/// Run-level knobs for one pipeline invocation
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Skip work items already present in the record store
    pub resume: bool,
    /// Cap on processed items after resume filtering
    pub limit: Option<usize>,
    /// Whether covers are generated and uploaded
    pub cover_mode: CoverMode,
    /// Pause between generation calls in generate-only mode
    pub generate_delay: Duration,
    /// Pause after each successful publish
    pub publish_delay: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            resume: false,
            limit: None,
            cover_mode: CoverMode::Generate,
            generate_delay: Duration::from_millis(1500),
            publish_delay: Duration::from_secs(900),
        }
    }
}

/// What happened across one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items the loop looked at (after resume filtering and the limit)
    pub processed: usize,
    /// Items published and recorded
    pub published: usize,
    /// Items saved to the local archive (generate-only mode)
    pub archived: usize,
    /// Items skipped: no usable article, or cover generation exhausted
    pub skipped: usize,
    /// Items whose publish or archive attempt errored
    pub failed: usize,
}

enum ItemOutcome {
    Published,
    Skipped,
    Failed,
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

fn discard_cover(artifact: &CoverArtifact) {
    match artifact.remove() {
        Ok(()) => info!("Removed temporary cover {}", artifact.path.display()),
        Err(e) => warn!("Could not remove cover {}: {}", artifact.path.display(), e),
    }
}

/// The orchestrator owning every collaborator for one run
pub struct Pipeline<G: TextGenerator, I: ImageGenerator, D: Driver> {
    writer: ArticleWriter<G>,
    covers: CoverStudio<I>,
    session: Option<PublishSession<D>>,
    records: PublishedRecordStore,
    retry: RetryPolicy,
    archive_dir: PathBuf,
    options: PipelineOptions,
}

impl<G: TextGenerator, I: ImageGenerator, D: Driver> Pipeline<G, I, D> {
    /// A pipeline with no publish session archives articles locally;
    /// attach one with [`Pipeline::with_session`] to actually publish.
    pub fn new(
        writer: ArticleWriter<G>,
        covers: CoverStudio<I>,
        records: PublishedRecordStore,
        options: PipelineOptions,
    ) -> Self {
        Self {
            writer,
            covers,
            session: None,
            records,
            retry: RetryPolicy::default(),
            archive_dir: PathBuf::from("generated_articles"),
            options,
        }
    }

    pub fn with_session(mut self, session: PublishSession<D>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = dir.into();
        self
    }

    /// Process the queue.
    ///
    /// Resume filtering and the limit shrink the queue up front; the
    /// remainder is processed in input order. The only errors this returns
    /// are setup failures (login); everything per-item is logged and
    /// counted in the summary instead.
    pub async fn run(&mut self, items: Vec<WorkItem>) -> Result<RunSummary> {
        let mut items = items;

        if self.options.resume {
            let published = self.records.load();
            info!("Loaded {} published records", published.len());
            items = filter_unpublished(items, &published);
        }
        if let Some(limit) = self.options.limit {
            items.truncate(limit);
        }

        if items.is_empty() {
            info!("No work items to process.");
            return Ok(RunSummary::default());
        }

        if let Some(session) = self.session.as_mut() {
            session.ensure_login().await?;
        }

        let total = items.len();
        info!("Processing {} work items.", total);
        let mut summary = RunSummary::default();

        for (idx, item) in items.iter().enumerate() {
            summary.processed += 1;
            info!("[{}/{}] Drafting article for: {}", idx + 1, total, item.title);

            let article = match self.writer.draft(&item.title, Some(&item.url)).await {
                Ok(Some(article)) => article,
                Ok(None) => {
                    warn!("Topic '{}' yielded no usable article, skipping.", item.title);
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!("Drafting '{}' failed ({}), skipping.", item.title, e);
                    summary.skipped += 1;
                    continue;
                }
            };

            if self.session.is_some() {
                match self.publish_one(item, &article).await {
                    ItemOutcome::Published => {
                        summary.published += 1;
                        info!(
                            "Waiting {:.1} minutes before the next item...",
                            self.options.publish_delay.as_secs_f64() / 60.0
                        );
                        pause(self.options.publish_delay).await;
                    }
                    ItemOutcome::Skipped => summary.skipped += 1,
                    ItemOutcome::Failed => summary.failed += 1,
                }
            } else {
                match archive::save_article(&self.archive_dir, &item.title, &article) {
                    Ok(_) => summary.archived += 1,
                    Err(e) => {
                        warn!("Could not archive '{}': {}", article.title, e);
                        summary.failed += 1;
                    }
                }
                pause(self.options.generate_delay).await;
            }
        }

        info!("All work items processed.");
        Ok(summary)
    }

    /// Publish a single drafted article. Never fails the run: the outcome
    /// is folded into the summary and the loop moves on.
    async fn publish_one(&mut self, item: &WorkItem, article: &Article) -> ItemOutcome {
        let use_cover = self.options.cover_mode == CoverMode::Generate;

        let cover = if use_cover {
            let excerpt_string: String = article.body.chars().take(100).collect();
            let excerpt = excerpt_string.as_str();
            let title = article.title.as_str();
            let studio = &self.covers;
            let retry = self.retry;
            let max = retry.max_attempts;

            match retry
                .run(move |attempt| async move {
                    info!("Generating cover (attempt {}/{})...", attempt, max);
                    studio.create(title, excerpt).await
                })
                .await
            {
                Ok(artifact) => Some(artifact),
                Err(exhausted) => {
                    warn!(
                        "Cover generation for '{}' {}; skipping this article",
                        article.title, exhausted
                    );
                    return ItemOutcome::Skipped;
                }
            }
        } else {
            None
        };

        let html = markdown_to_html(&article.body);
        let cover_path = cover.as_ref().map(|artifact| artifact.path.as_path());

        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return ItemOutcome::Skipped,
        };

        match session
            .publish(&article.title, &html, cover_path, use_cover)
            .await
        {
            Ok(()) => {
                info!("'{}' published.", article.title);
                // The record is written strictly after the confirmed
                // publish; a crash in between re-publishes rather than
                // losing an article.
                if let Err(e) = self.records.add(item.identifier()) {
                    warn!(
                        "Could not record '{}' as published: {}",
                        item.identifier(),
                        e
                    );
                }
                if let Some(artifact) = &cover {
                    discard_cover(artifact);
                }
                ItemOutcome::Published
            }
            Err(e) => {
                error!("Publishing '{}' failed: {}", article.title, e);
                if let Some(artifact) = &cover {
                    discard_cover(artifact);
                }
                ItemOutcome::Failed
            }
        }
    }
}
