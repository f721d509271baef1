//! Autopress CLI - trend-to-article publishing pipeline
//!
//! Usage:
//!   autopress init                 Write a default autopress.toml
//!   autopress crawl                Fetch trends into the queue file
//!   autopress publish              Generate and publish, resuming past
//!                                  already-published items
//!   autopress full                 Crawl, then generate and publish the
//!                                  fresh queue (no resume filtering)

use anyhow::{Context, Result};
use autopress_ai::{ArticleWriter, ChatCompletionClient, CoverStudio, TextToImageClient, TopicScreen};
use autopress_browser::{load_cookie_file, CdpDriver, SelectorCache, SelectorResolver};
use autopress_core::{AutopressConfig, CoverMode};
use autopress_pipeline::{
    crawl_trends, load_work_items, JsonTrendFeed, Pipeline, PipelineOptions,
    PublishedRecordStore,
};
use autopress_publisher::PublishSession;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "autopress")]
#[command(author, version, about = "Trend-to-article publishing pipeline")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file
    #[arg(long, default_value = "autopress.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Fetch trending topics into the work-item queue
    Crawl {
        /// Maximum topics to fetch (defaults to the configured limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Skip the sensitive-topic screen
        #[arg(long)]
        no_screen: bool,
    },

    /// Generate and publish, skipping already-published items
    Publish(RunArgs),

    /// Crawl first, then generate and publish the fresh queue
    Full {
        /// Maximum topics to fetch during the crawl
        #[arg(long)]
        crawl_limit: Option<usize>,

        #[command(flatten)]
        run: RunArgs,
    },
}

/// Flags shared by the generating modes
#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    /// Limit the number of articles processed
    #[arg(long)]
    limit: Option<usize>,

    /// Seconds between generation API calls
    #[arg(long)]
    generate_delay: Option<f64>,

    /// Seconds to wait after each publish
    #[arg(long)]
    publish_delay: Option<f64>,

    /// Run the browser headless
    #[arg(long)]
    headless: bool,

    /// Cover handling
    #[arg(long, value_enum)]
    cover_mode: Option<CliCoverMode>,

    /// Cover style id understood by the image API
    #[arg(long)]
    cover_style: Option<String>,

    /// Cover resolution in W:H form
    #[arg(long)]
    cover_resolution: Option<String>,

    /// Negative prompt for cover generation
    #[arg(long)]
    cover_negative: Option<String>,

    /// 1 adds the provider watermark, 0 omits it
    #[arg(long)]
    cover_logo: Option<i64>,

    /// Archive articles locally instead of publishing
    #[arg(long)]
    no_publish: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliCoverMode {
    /// Publish without a cover
    None,
    /// Generate and upload a cover
    Generate,
}

impl From<CliCoverMode> for CoverMode {
    fn from(mode: CliCoverMode) -> Self {
        match mode {
            CliCoverMode::None => CoverMode::None,
            CliCoverMode::Generate => CoverMode::Generate,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let mut config = AutopressConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command {
        Commands::Init => {
            AutopressConfig::write_default(&cli.config)
                .with_context(|| format!("Failed to write {}", cli.config.display()))?;
            println!("Wrote default configuration to {}", cli.config.display());
        }

        Commands::Crawl { limit, no_screen } => {
            let kept = run_crawl(&config, limit, !no_screen).await?;
            info!("Crawl complete: {} topics in the queue.", kept);
        }

        Commands::Publish(args) => {
            apply_overrides(&mut config, &args);
            run_pipeline(&config, &args, true).await?;
        }

        Commands::Full { crawl_limit, run } => {
            apply_overrides(&mut config, &run);
            let kept = run_crawl(&config, crawl_limit, config.trends.screen_topics).await?;
            info!("Crawl complete: {} topics in the queue.", kept);
            // The queue was just rebuilt from scratch, so resume filtering
            // would only hide fresh topics that recycle an old URL.
            run_pipeline(&config, &run, false).await?;
        }
    }

    Ok(())
}

/// Fold command-line overrides into the loaded configuration
fn apply_overrides(config: &mut AutopressConfig, args: &RunArgs) {
    if let Some(delay) = args.generate_delay {
        config.pipeline.generate_delay_secs = delay;
    }
    if let Some(delay) = args.publish_delay {
        config.pipeline.publish_delay_secs = delay;
    }
    if let Some(style) = &args.cover_style {
        config.cover.style = style.clone();
    }
    if let Some(resolution) = &args.cover_resolution {
        config.cover.resolution = resolution.clone();
    }
    if let Some(negative) = &args.cover_negative {
        config.cover.negative_prompt = negative.clone();
    }
    if let Some(watermark) = args.cover_logo {
        config.cover.watermark = watermark;
    }
    if args.headless {
        config.browser.headless = true;
    }
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

async fn run_crawl(
    config: &AutopressConfig,
    limit: Option<usize>,
    screen_enabled: bool,
) -> Result<usize> {
    let feed = JsonTrendFeed::new(config.trends.feed_url.clone());
    let limit = limit.unwrap_or(config.trends.limit);

    let screen = if screen_enabled && config.trends.screen_topics {
        Some(TopicScreen::new(ChatCompletionClient::new(
            config.writer.clone(),
        )))
    } else {
        None
    };

    let kept = crawl_trends(&feed, screen.as_ref(), limit, &config.pipeline.queue_file)
        .await
        .context("Crawling the trend feed failed")?;
    Ok(kept)
}

async fn run_pipeline(config: &AutopressConfig, args: &RunArgs, resume: bool) -> Result<()> {
    let items = load_work_items(&config.pipeline.queue_file);

    let writer = ArticleWriter::new(ChatCompletionClient::new(config.writer.clone()));
    let covers = CoverStudio::new(
        TextToImageClient::new(config.cover.clone()),
        config.cover.clone(),
    );
    let records = PublishedRecordStore::new(&config.pipeline.records_file);

    let options = PipelineOptions {
        resume,
        limit: args.limit,
        cover_mode: args.cover_mode.map(Into::into).unwrap_or_default(),
        generate_delay: seconds(config.pipeline.generate_delay_secs),
        publish_delay: seconds(config.pipeline.publish_delay_secs),
    };

    let mut pipeline: Pipeline<_, _, CdpDriver> =
        Pipeline::new(writer, covers, records, options)
            .with_archive_dir(&config.pipeline.article_dir);

    if !args.no_publish {
        // Everything in this block is run setup: a failure here aborts
        // with a non-zero exit instead of skipping items.
        let cookies = load_cookie_file(&config.pipeline.cookie_file)
            .context("Cannot publish without session cookies")?;
        let driver = CdpDriver::launch(&config.browser, &config.portal.user_agent)
            .await
            .context("Browser launch failed")?;
        let resolver =
            SelectorResolver::new(SelectorCache::load(&config.pipeline.selector_cache_file));
        let session = PublishSession::new(driver, resolver, config.portal.clone(), cookies);
        pipeline = pipeline.with_session(session);
    }

    let summary = pipeline.run(items).await?;
    info!(
        "Run finished: {} processed, {} published, {} archived, {} skipped, {} failed.",
        summary.processed, summary.published, summary.archived, summary.skipped, summary.failed
    );
    Ok(())
}
