//! Crawler module for catalog page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with politeness delays and retry logic
//! - HTML extraction for menus, listings and product pages
//! - Pagination of category listings
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod pagination;
mod parser;

pub use coordinator::{crawl_and_export, run_crawl, Coordinator, MISSING_NAME};
pub use fetcher::{build_http_client, AttemptOutcome, DocumentSource, Fetcher, RetryPolicy};
pub use pagination::PaginationWalker;
pub use parser::{find_in, find_node, ListingPage, MenuEntry, PageLayout, PageLink, ProductPage};

use crate::config::Config;
use crate::output::{CrawlStatistics, CsvExporter};
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP fetcher from the configuration
/// 2. Discover the allowed categories and their leaves
/// 3. Walk every listing and scrape its products
/// 4. Write the CSV file named in the `[output]` section
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl completed and the file was written
/// * `Err(CatalogError)` - Crawl failed
pub async fn crawl(config: Config) -> Result<CrawlStatistics> {
    let exporter = CsvExporter::new(config.output_path());
    run_crawl(config, &exporter).await
}
