//! Exporter traits and types
//!
//! This module defines the trait interface for exporters and the report
//! they hand back after writing a crawl result.

use crate::catalog::Product;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// What an exporter wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Data rows written, header excluded
    pub rows_written: usize,

    /// Where the rows went (file path or other sink name)
    pub destination: String,
}

/// Trait for exporters
///
/// An exporter receives the products of a finished crawl, in crawl order, and
/// writes them somewhere. It is called once per run.
pub trait Exporter {
    /// Writes all products
    ///
    /// # Arguments
    ///
    /// * `products` - Products in crawl order with their recorded variants
    ///
    /// # Returns
    ///
    /// * `Ok(ExportReport)` - What was written and where
    /// * `Err(OutputError)` - The sink could not be written
    fn export(&self, products: &[Product]) -> OutputResult<ExportReport>;
}
