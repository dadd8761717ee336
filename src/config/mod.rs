//! Configuration module for Catalog-Walker
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use catalog_walker::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawling {} top-level categories", config.categories.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, LoggingConfig, OutputConfig, RestartConfig, DEFAULT_PAGE_SIZE};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
