//! Crawl statistics
//!
//! Counters gathered by the coordinator during a run and their console
//! rendering.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Top-level categories visited (after allow-list filtering)
    pub top_level_categories: usize,

    /// Leaf categories found by hierarchy resolution
    pub leaf_categories: usize,

    /// Product pages fetched
    pub product_pages: usize,

    /// Products collected, including those without fresh variants
    pub products: usize,

    /// Variants recorded after deduplication
    pub variants: usize,

    /// Offer rows without article and barcode
    pub skipped_without_identity: usize,

    /// Offer rows already emitted earlier in the run
    pub skipped_duplicates: usize,

    /// Data rows written by the exporter
    pub rows_written: usize,

    /// Wall-clock duration of the crawl phase
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Offer rows dropped for any reason
    pub fn skipped_total(&self) -> usize {
        self.skipped_without_identity + self.skipped_duplicates
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Categories:");
    println!("  Top-level visited: {}", stats.top_level_categories);
    println!("  Leaf categories: {}", stats.leaf_categories);
    println!();

    println!("Products:");
    println!("  Product pages fetched: {}", stats.product_pages);
    println!("  Products collected: {}", stats.products);
    println!("  Variants recorded: {}", stats.variants);
    println!();

    if stats.skipped_total() > 0 {
        println!("Skipped Offers:");
        println!("  Without article or barcode: {}", stats.skipped_without_identity);
        println!("  Already exported: {}", stats.skipped_duplicates);
        println!();
    }

    println!(
        "Rows written: {} (crawl took {:.1}s)",
        stats.rows_written,
        stats.elapsed.as_secs_f64()
    );
}
