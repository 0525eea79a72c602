//! JobHarvest: a batch/retry harvester for paginated job listings
//!
//! This crate implements the link-discovery-and-bounded-extraction pipeline:
//! it paginates a listing endpoint to collect a deduplicated set of detail
//! links, visits each link under a fixed concurrency limit, recycles the
//! shared browser session after every batch, retries failed links in
//! shrinking rounds, checkpoints every round to disk, and consolidates all
//! successful records into one final output.
//!
//! The headless browser engine and the per-site DOM logic are external
//! collaborators, reached through the traits in [`browser`] and [`extract`].

pub mod browser;
pub mod config;
pub mod extract;
pub mod harvest;
pub mod output;
pub mod record;
pub mod site;

use thiserror::Error;

/// Main error type for JobHarvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Unknown site: {0}")]
    UnknownSite(String),

    #[error("No links to process: {0}")]
    EmptyLinkList(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for JobHarvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{FailedLink, FieldValue, Link, Record, RoundResult, RunSummary};
pub use site::SiteProfile;
