//! Harvest pipeline: discovery, bounded extraction, batching, and retries
//!
//! [`run`] is the whole pipeline for one site/keyword pair: discover links,
//! extract them in batched retry rounds, consolidate. [`run_rescrape`] is the
//! same machinery seeded from a failure file instead of discovery.

mod batch;
mod coordinator;
mod frontier;
mod worker;

pub use batch::BatchResourceManager;
pub use coordinator::{Checkpointer, RetryCoordinator};
pub use frontier::LinkFrontier;
pub use worker::ExtractionWorkerPool;

use crate::browser::BrowserEngine;
use crate::config::Config;
use crate::extract::ExtractorRegistry;
use crate::output::{load_links, Consolidator, CsvCheckpointer, OutputPaths};
use crate::record::{Link, RunSummary};
use crate::site::{profile_for, SiteProfile};
use crate::HarvestError;
use std::path::Path;
use std::sync::Arc;

/// Runs the full pipeline for the configured site and keyword
pub async fn run(
    engine: &dyn BrowserEngine,
    config: &Config,
    config_hash: &str,
) -> crate::Result<RunSummary> {
    let profile = site_profile(config)?;

    tracing::info!(
        "Starting harvest: site={} keyword={}",
        profile.id,
        config.run.keyword
    );

    let frontier = LinkFrontier::new(
        profile.clone(),
        config.browser.clone(),
        config.run.max_pages,
        config.run.max_consecutive_empty,
    );
    let session = engine.new_session().await?;
    let links = frontier.discover(session.as_ref(), &config.run.keyword).await;
    session.close().await;
    let links = links?;

    if links.is_empty() {
        return Err(HarvestError::EmptyLinkList(format!(
            "no links discovered for keyword '{}'",
            config.run.keyword
        )));
    }

    let paths = OutputPaths::new(&config.output.data_dir, &profile.id, &config.run.keyword);
    process_links(engine, config, config_hash, profile, paths, links).await
}

/// Re-runs extraction for the links in a previously written failure file
pub async fn run_rescrape(
    engine: &dyn BrowserEngine,
    config: &Config,
    config_hash: &str,
    failure_file: &Path,
) -> crate::Result<RunSummary> {
    let profile = site_profile(config)?;
    let links = load_links(failure_file).map_err(HarvestError::Output)?;

    if links.is_empty() {
        return Err(HarvestError::EmptyLinkList(format!(
            "no links in {}",
            failure_file.display()
        )));
    }

    tracing::info!(
        "Rescraping {} links from {}",
        links.len(),
        failure_file.display()
    );

    let paths = OutputPaths::new(&config.output.data_dir, &profile.id, &config.run.keyword)
        .rescraped();
    process_links(engine, config, config_hash, profile, paths, links).await
}

fn site_profile(config: &Config) -> crate::Result<SiteProfile> {
    profile_for(&config.run.site)
        .ok_or_else(|| HarvestError::UnknownSite(config.run.site.clone()))
}

async fn process_links(
    engine: &dyn BrowserEngine,
    config: &Config,
    config_hash: &str,
    profile: SiteProfile,
    paths: OutputPaths,
    links: Vec<Link>,
) -> crate::Result<RunSummary> {
    let checkpointer = CsvCheckpointer::new(paths.clone())?;
    let extractor = Arc::new(ExtractorRegistry::for_profile(
        profile,
        config.browser.clone(),
    ));
    let pool = ExtractionWorkerPool::new(
        extractor,
        config.run.concurrency_limit as usize,
        config.browser.extraction_timeout(),
    );

    let coordinator = RetryCoordinator::new(
        BatchResourceManager::new(engine, config.run.batch_size as usize),
        &checkpointer,
        config.run.max_retries,
    );
    let rounds = coordinator.run(&pool, links).await?;

    let summary = Consolidator::new(paths, config_hash).consolidate(&rounds)?;
    tracing::info!(
        "Harvest complete: {}/{} links succeeded ({:.1}%)",
        summary.total_successes,
        summary.total_links,
        summary.success_rate()
    );
    Ok(summary)
}
