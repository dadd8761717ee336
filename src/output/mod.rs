//! Output module for exporting crawl results
//!
//! This module handles:
//! - Writing deduplicated products to a CSV file
//! - The exporter interface other sinks can implement
//! - Recording and printing crawl statistics

mod csv_export;
pub mod stats;
mod traits;

pub use csv_export::{CsvExporter, CSV_HEADER};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{ExportReport, Exporter, OutputError, OutputResult};
