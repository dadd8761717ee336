//! Catalog-Walker: a polite online catalog crawler
//!
//! This crate discovers the category tree of a catalog site, walks the paginated
//! product listings of every leaf category, and collects deduplicated product
//! offers for export.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Catalog-Walker operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The fetch retry budget was exhausted. This is the only fatal crawl error.
    #[error(
        "Network unavailable for {url}: {restarts} reconnect cycles exhausted after {attempts} requests"
    )]
    ConnectionFailure {
        url: String,
        restarts: u32,
        attempts: u32,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid sub-menu pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Cannot resolve '{href}' against {base}")]
    Unresolvable { base: String, href: String },
}

/// Result type alias for Catalog-Walker operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use catalog::{Category, Product, ProductRegistry, Variant, VariantKey};
pub use config::Config;
pub use crawler::{Coordinator, DocumentSource, Fetcher};
