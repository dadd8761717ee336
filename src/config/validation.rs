use crate::config::types::{seconds, Config, LoggingConfig, OutputConfig, RestartConfig};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_url(&config.url)?;
    validate_delay_range(config.delay_range_s)?;
    validate_retry_config(&config.restart, config.max_retries)?;
    validate_sub_menu_pattern(&config.pattern_sub_menu)?;
    validate_output_config(&config.output)?;
    validate_logging_config(&config.logging)?;

    if config.page_size < 1 {
        return Err(ConfigError::Validation("page_size must be >= 1".to_string()));
    }

    Ok(())
}

/// Validates the site base URL
fn validate_site_url(url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid url '{}': {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "url '{}' must use http or https",
            url
        )));
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!("url '{}' has no host", url)));
    }

    Ok(())
}

/// Validates the politeness delay range
fn validate_delay_range(range: [f64; 2]) -> Result<(), ConfigError> {
    let [min, max] = range;

    if !min.is_finite() || !max.is_finite() || min < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay_range_s must hold non-negative seconds, got [{}, {}]",
            min, max
        )));
    }

    if min > max {
        return Err(ConfigError::Validation(format!(
            "delay_range_s min must not exceed max, got [{}, {}]",
            min, max
        )));
    }

    seconds("delay_range_s", min)?;
    seconds("delay_range_s", max)?;
    Ok(())
}

/// Validates the two-level retry bounds
fn validate_retry_config(restart: &RestartConfig, max_retries: u32) -> Result<(), ConfigError> {
    if restart.restart_count < 1 {
        return Err(ConfigError::Validation(format!(
            "restart.restart_count must be >= 1, got {}",
            restart.restart_count
        )));
    }

    if !restart.interval_m.is_finite() || restart.interval_m < 0.0 {
        return Err(ConfigError::Validation(format!(
            "restart.interval_m must be >= 0, got {}",
            restart.interval_m
        )));
    }

    seconds("restart.interval_m", restart.interval_m)?;

    if max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            max_retries
        )));
    }

    Ok(())
}

fn validate_sub_menu_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "PATTERN_SUB_MENU cannot be empty".to_string(),
        ));
    }

    Regex::new(pattern)
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.output_directory.is_empty() {
        return Err(ConfigError::Validation(
            "output_directory cannot be empty".to_string(),
        ));
    }

    if config.filename_output.is_empty() {
        return Err(ConfigError::Validation(
            "filename_output cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<(), ConfigError> {
    if config.logs_filename.is_empty() {
        return Err(ConfigError::Validation(
            "logs_filename cannot be empty".to_string(),
        ));
    }

    Ok(())
}
