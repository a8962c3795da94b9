use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use homescout::infrastructure::{logging, ChromeSessionFactory, ScraperConfig};
use homescout::CrawlOrchestrator;

#[derive(Parser)]
#[command(name = "homescout", version, about = "Scrape community listings from a builder site")]
struct Cli {
    /// Optional JSON config file; missing fields keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output root for JSON records and mirrored page sources.
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the location index and save all community summaries.
    Discover,
    /// Scrape a single community detail page.
    Community {
        #[arg(long)]
        url: String,
    },
    /// Process every entry of a previously discovered summaries file.
    Batch {
        /// Summaries file; defaults to <output>/communities_links.json.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ScraperConfig::load(path)?,
        None => ScraperConfig::default(),
    };
    if let Some(output) = cli.output {
        config.output_dir = output;
    }

    let _log_guard = logging::init(&config.logging)?;

    let page_timeout = Duration::from_millis(config.fetch.marker_timeout_ms);
    let factory = ChromeSessionFactory::new(page_timeout);
    let mut orchestrator = CrawlOrchestrator::new(config, Box::new(factory))?;

    // Partial failure is logged, never turned into a non-zero exit; only an
    // unusable invocation (bad config, unreadable batch input) fails hard.
    let outcome = match cli.command {
        Command::Discover => orchestrator.discover().map(|_| ()),
        Command::Community { url } => orchestrator.run_single(&url),
        Command::Batch { input } => orchestrator.run_batch(input.as_deref()),
    };
    if let Err(e) = outcome {
        error!("run failed: {e:#}");
    }
    Ok(())
}
