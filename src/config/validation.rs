use crate::config::types::{BrowserConfig, Config, OutputConfig, RunConfig};
use crate::site::known_sites;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_run_config(&config.run)?;
    validate_browser_config(&config.browser)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates harvest run parameters
fn validate_run_config(config: &RunConfig) -> Result<(), ConfigError> {
    let sites = known_sites();
    if !sites.contains(&config.site) {
        return Err(ConfigError::Validation(format!(
            "unknown site '{}', expected one of: {}",
            config.site,
            sites.join(", ")
        )));
    }

    validate_keyword(&config.keyword)?;

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.concurrency_limit < 1 || config.concurrency_limit > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency_limit must be between 1 and 100, got {}",
            config.concurrency_limit
        )));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    if config.max_consecutive_empty < 1 {
        return Err(ConfigError::Validation(format!(
            "max_consecutive_empty must be >= 1, got {}",
            config.max_consecutive_empty
        )));
    }

    // max_retries = 0 is legal: a single round with no retry rounds.

    Ok(())
}

/// Validates browser timeouts and polling bounds
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_ms must be >= 1000ms, got {}ms",
            config.navigation_timeout_ms
        )));
    }

    if config.selector_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "selector_timeout_ms must be >= 100ms, got {}ms",
            config.selector_timeout_ms
        )));
    }

    if config.poll_interval_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be >= 1ms, got {}ms",
            config.poll_interval_ms
        )));
    }

    if config.max_poll_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_poll_attempts must be >= 1, got {}",
            config.max_poll_attempts
        )));
    }

    if config.extraction_timeout_ms < config.navigation_timeout_ms {
        return Err(ConfigError::Validation(format!(
            "extraction_timeout_ms ({}ms) must cover at least one navigation ({}ms)",
            config.extraction_timeout_ms, config.navigation_timeout_ms
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a search keyword: non-empty slug, safe to embed in URLs and
/// output file names
fn validate_keyword(keyword: &str) -> Result<(), ConfigError> {
    if keyword.is_empty() {
        return Err(ConfigError::Validation(
            "keyword cannot be empty".to_string(),
        ));
    }

    if !keyword
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "keyword must contain only alphanumeric characters, hyphens, and underscores, got '{}'",
            keyword
        )));
    }

    if keyword.starts_with('-') || keyword.ends_with('-') {
        return Err(ConfigError::Validation(format!(
            "keyword cannot start or end with '-', got '{}'",
            keyword
        )));
    }

    Ok(())
}
