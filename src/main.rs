//! JobHarvest main entry point
//!
//! This is the command-line interface for the JobHarvest listing harvester.

use anyhow::Context;
use clap::Parser;
use jobharvest::browser::BrowserEngine;
use jobharvest::config::load_config_with_hash;
use jobharvest::output::{print_summary, Consolidator, OutputPaths};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// JobHarvest: a batch/retry harvester for paginated job listings
///
/// JobHarvest paginates a portal's listing pages for one keyword, extracts
/// every discovered detail page under a concurrency limit, retries failures
/// in shrinking rounds, and consolidates the results into one CSV.
#[derive(Parser, Debug)]
#[command(name = "jobharvest")]
#[command(version = "0.1.0")]
#[command(about = "A batch/retry harvester for paginated job listings", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the configured search keyword
    #[arg(long, value_name = "KEYWORD")]
    keyword: Option<String>,

    /// Override the configured maximum listing pages
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Validate config and show what would be harvested without running
    #[arg(long, conflicts_with_all = ["consolidate", "rescrape"])]
    dry_run: bool,

    /// Rebuild the final CSV and summary from round checkpoints and exit
    #[arg(long, conflicts_with_all = ["dry_run", "rescrape"])]
    consolidate: bool,

    /// With --consolidate: rebuild from a rescrape run's checkpoints
    #[arg(long, requires = "consolidate")]
    rescraped: bool,

    /// Re-run extraction for the links in a failure file
    #[arg(long, value_name = "FILE", conflicts_with_all = ["dry_run", "consolidate"])]
    rescrape: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(keyword) = cli.keyword {
        config.run.keyword = keyword;
    }
    if let Some(max_pages) = cli.max_pages {
        config.run.max_pages = max_pages;
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.consolidate {
        handle_consolidate(&config, &config_hash, cli.rescraped)?;
    } else if let Some(failure_file) = cli.rescrape {
        let engine = build_engine()?;
        let summary =
            jobharvest::harvest::run_rescrape(engine.as_ref(), &config, &config_hash, &failure_file)
                .await?;
        print_summary(&summary);
    } else {
        let engine = build_engine()?;
        let summary = jobharvest::harvest::run(engine.as_ref(), &config, &config_hash).await?;
        print_summary(&summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("jobharvest=info,warn"),
            1 => EnvFilter::new("jobharvest=debug,info"),
            2 => EnvFilter::new("jobharvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Binds the browser engine for this build.
///
/// The engine is an external capability: production deployments link a
/// headless-browser implementation of [`BrowserEngine`] here. The JOBHARVEST_ENGINE
/// variable selects `scripted` (the in-memory engine, useful for exercising
/// the pipeline end to end without a browser).
fn build_engine() -> anyhow::Result<Box<dyn BrowserEngine>> {
    match std::env::var("JOBHARVEST_ENGINE").as_deref() {
        Ok("scripted") => {
            tracing::warn!("Using the scripted in-memory engine; no real pages will be fetched");
            Ok(Box::new(jobharvest::browser::fixture::FixtureEngine::new()))
        }
        _ => anyhow::bail!(
            "no browser engine bound: this build ships the pipeline only; \
             link a BrowserEngine implementation (or set JOBHARVEST_ENGINE=scripted \
             to exercise the pipeline against the in-memory engine)"
        ),
    }
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &jobharvest::Config) {
    println!("=== JobHarvest Dry Run ===\n");

    println!("Run:");
    println!("  Site: {}", config.run.site);
    println!("  Keyword: {}", config.run.keyword);
    println!("  Max pages: {}", config.run.max_pages);
    println!("  Concurrency limit: {}", config.run.concurrency_limit);
    println!("  Batch size: {}", config.run.batch_size);
    println!("  Max retries: {}", config.run.max_retries);
    println!(
        "  Max consecutive empty pages: {}",
        config.run.max_consecutive_empty
    );

    println!("\nBrowser:");
    println!(
        "  Navigation timeout: {}ms",
        config.browser.navigation_timeout_ms
    );
    println!(
        "  Selector timeout: {}ms",
        config.browser.selector_timeout_ms
    );
    println!(
        "  Extraction timeout: {}ms",
        config.browser.extraction_timeout_ms
    );

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);
    let paths = OutputPaths::new(&config.output.data_dir, &config.run.site, &config.run.keyword);
    println!("  Round 0 records: {}", paths.round_records(0).display());
    println!("  Final records: {}", paths.final_records().display());

    println!("\n✓ Configuration is valid");
}

/// Handles the --consolidate mode: rebuilds final output from checkpoints
fn handle_consolidate(
    config: &jobharvest::Config,
    config_hash: &str,
    rescraped: bool,
) -> anyhow::Result<()> {
    let mut paths =
        OutputPaths::new(&config.output.data_dir, &config.run.site, &config.run.keyword);
    if rescraped {
        paths = paths.rescraped();
    }
    let summary = Consolidator::new(paths, config_hash)
        .consolidate_from_disk()
        .context("failed to consolidate round checkpoints")?;
    print_summary(&summary);
    Ok(())
}
