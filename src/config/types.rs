use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for JobHarvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub run: RunConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    pub output: OutputConfig,
}

/// Harvest run parameters
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Site identifier; must name a built-in site profile
    pub site: String,

    /// Search keyword, slug form (e.g. "data-analyst")
    pub keyword: String,

    /// Maximum listing pages to paginate through
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Maximum detail pages open/processing simultaneously
    #[serde(rename = "concurrency-limit", default = "default_concurrency_limit")]
    pub concurrency_limit: u32,

    /// Links processed per browser session before recycling
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: u32,

    /// Retry rounds after round 0 (total rounds <= max-retries + 1)
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Consecutive zero-new-link pages before discovery stops
    #[serde(
        rename = "max-consecutive-empty",
        default = "default_max_consecutive_empty"
    )]
    pub max_consecutive_empty: u32,
}

/// Browser engine timeouts and polling bounds
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Page navigation timeout (milliseconds)
    #[serde(rename = "navigation-timeout-ms", default = "default_navigation_timeout")]
    pub navigation_timeout_ms: u64,

    /// Wait-for-selector timeout (milliseconds)
    #[serde(rename = "selector-timeout-ms", default = "default_selector_timeout")]
    pub selector_timeout_ms: u64,

    /// Delay between expander dismiss attempts (milliseconds)
    #[serde(rename = "poll-interval-ms", default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Dismiss attempts before an expander counts as stuck
    #[serde(rename = "max-poll-attempts", default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// Whole-extraction deadline per link (milliseconds)
    #[serde(rename = "extraction-timeout-ms", default = "default_extraction_timeout")]
    pub extraction_timeout_ms: u64,
}

impl BrowserConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_millis(self.extraction_timeout_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: default_navigation_timeout(),
            selector_timeout_ms: default_selector_timeout(),
            poll_interval_ms: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
            extraction_timeout_ms: default_extraction_timeout(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the round, error, final, and summary files are written to
    #[serde(rename = "data-dir")]
    pub data_dir: String,
}

fn default_max_pages() -> u32 {
    50
}

fn default_concurrency_limit() -> u32 {
    10
}

fn default_batch_size() -> u32 {
    3000
}

fn default_max_retries() -> u32 {
    2
}

fn default_max_consecutive_empty() -> u32 {
    3
}

fn default_navigation_timeout() -> u64 {
    30_000
}

fn default_selector_timeout() -> u64 {
    15_000
}

fn default_poll_interval() -> u64 {
    500
}

fn default_max_poll_attempts() -> u32 {
    20
}

fn default_extraction_timeout() -> u64 {
    120_000
}
