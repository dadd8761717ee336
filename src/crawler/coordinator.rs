//! Crawler coordinator - main crawl orchestration logic
//!
//! This module sequences a complete crawl:
//! - Discovering top-level and sub-categories from the site menus
//! - Resolving the category hierarchy into leaf categories
//! - Walking the listing pages of every leaf category
//! - Fetching product pages and aggregating their offers
//! - Handing the finished products to an exporter

use crate::catalog::{CategoryHierarchy, LeafCategory, Product, ProductAggregator};
use crate::config::Config;
use crate::crawler::fetcher::{DocumentSource, Fetcher};
use crate::crawler::pagination::PaginationWalker;
use crate::crawler::parser::PageLayout;
use crate::output::{CrawlStatistics, Exporter};
use crate::url::{canonical_link, listing_url, resolve_link};
use crate::{CatalogError, ConfigError, Result};
use std::time::Instant;

/// Placeholder name for products whose page shows none
pub const MISSING_NAME: &str = "Нет наименования";

/// Main crawler coordinator structure
pub struct Coordinator<S> {
    config: Config,
    source: S,
    layout: PageLayout,
    aggregator: ProductAggregator,
    stats: CrawlStatistics,
}

impl Coordinator<Fetcher> {
    /// Creates a coordinator fetching over HTTP
    pub fn from_config(config: Config) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        Self::new(config, fetcher)
    }
}

impl<S: DocumentSource> Coordinator<S> {
    /// Creates a new coordinator reading documents from `source`
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CatalogError)` - The sub-menu pattern does not compile
    pub fn new(config: Config, source: S) -> Result<Self> {
        let layout = PageLayout::new(&config.pattern_sub_menu).map_err(|e| {
            ConfigError::InvalidPattern(format!("'{}': {}", config.pattern_sub_menu, e))
        })?;

        Ok(Self {
            config,
            source,
            layout,
            aggregator: ProductAggregator::new(),
            stats: CrawlStatistics::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Statistics gathered so far
    pub fn statistics(&self) -> CrawlStatistics {
        let aggregated = self.aggregator.stats();
        CrawlStatistics {
            variants: aggregated.recorded,
            skipped_without_identity: aggregated.skipped_without_identity,
            skipped_duplicates: aggregated.skipped_duplicates,
            ..self.stats.clone()
        }
    }

    /// Discovers the allowed categories and resolves them into leaves
    ///
    /// Top-level entries missing from the `categories` allow-list are not
    /// visited at all.
    pub async fn discover_categories(&mut self) -> Result<Vec<LeafCategory>> {
        let home = self.source.get_document(&self.config.url).await?;
        let entries = self.layout.main_menu(&home);
        if entries.is_empty() {
            tracing::warn!("No catalog menu found on {}", self.config.url);
        }

        let mut hierarchy = CategoryHierarchy::new();

        for entry in entries {
            if !self.config.allows_category(&entry.name) {
                tracing::debug!("Skipping top-level category '{}'", entry.name);
                continue;
            }

            let url = match resolve_link(&self.config.url, &entry.href) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Skipping top-level category '{}': {}", entry.name, e);
                    continue;
                }
            };

            let page = self.source.get_document(&url).await?;
            let subcategories = self.layout.sub_categories(&page);
            tracing::info!(
                "Top-level category '{}': {} sub-categories",
                entry.name,
                subcategories.len()
            );

            self.stats.top_level_categories += 1;
            hierarchy.seed(&entry.name, subcategories);
        }

        let leaves = hierarchy.normalize();
        self.stats.leaf_categories = leaves.len();
        Ok(leaves)
    }

    /// Walks one leaf category and scrapes every product in it
    pub async fn crawl_category(&mut self, leaf: &LeafCategory) -> Result<Vec<Product>> {
        let path = leaf.category.path();
        let landing = match listing_url(&self.config.url, &leaf.url, self.config.page_size) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Skipping category {}: {}", path, e);
                return Ok(Vec::new());
            }
        };

        let product_urls = PaginationWalker::new(&self.source, &self.layout, &self.config.url)
            .walk(&landing)
            .await?;
        tracing::info!("Category {}: {} products", path, product_urls.len());

        let mut products = Vec::with_capacity(product_urls.len());
        for url in product_urls {
            products.push(self.scrape_product(&url, &path).await?);
        }

        Ok(products)
    }

    /// Fetches one product page and records its new offers
    ///
    /// Missing fields fall back to empty values; only a fetch failure is an
    /// error.
    pub async fn scrape_product(&mut self, url: &str, category_path: &str) -> Result<Product> {
        let body = self.source.get_document(url).await?;
        let page = self.layout.product(&body);
        self.stats.product_pages += 1;

        let link = canonical_link(url).unwrap_or_else(|_| url.to_string());
        let mut product = Product::new(link, category_path);

        if !page.has_detail {
            tracing::warn!("No product details on {}", url);
        }

        product.name = match page.name {
            Some(name) => name,
            None => {
                tracing::warn!("No product name on {}", url);
                MISSING_NAME.to_string()
            }
        };
        product.country = page.country.unwrap_or_default();

        for href in &page.image_hrefs {
            match resolve_link(&self.config.url, href) {
                Ok(image) => product.add_image(image),
                Err(e) => tracing::debug!("Skipping image on {}: {}", url, e),
            }
        }

        self.aggregator.aggregate(&mut product, page.offers);
        Ok(product)
    }

    /// Runs the whole crawl and returns every scraped product
    ///
    /// # Errors
    ///
    /// Aborts with `ConnectionFailure` as soon as any document cannot be
    /// fetched within the retry budget.
    pub async fn run(&mut self) -> Result<Vec<Product>> {
        let start_time = Instant::now();
        let leaves = self.discover_categories().await?;
        tracing::info!("Discovered {} leaf categories", leaves.len());

        let mut products = Vec::new();
        for leaf in &leaves {
            let found = self.crawl_category(leaf).await?;
            products.extend(found);
        }

        self.stats.products = products.len();
        self.stats.elapsed = start_time.elapsed();
        tracing::info!(
            "Crawl finished: {} products from {} categories in {:?}",
            products.len(),
            leaves.len(),
            self.stats.elapsed
        );

        Ok(products)
    }
}

/// Runs a complete crawl over HTTP and exports the result
///
/// 1. Discover and resolve categories
/// 2. Walk every leaf category and scrape its products
/// 3. Write the products with `exporter`
///
/// Nothing is exported when the crawl aborts.
///
/// # Example
///
/// ```no_run
/// use catalog_walker::config::load_config;
/// use catalog_walker::crawler::run_crawl;
/// use catalog_walker::output::CsvExporter;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let exporter = CsvExporter::new(config.output_path());
/// let stats = run_crawl(config, &exporter).await?;
/// println!("{} rows written", stats.rows_written);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config, exporter: &dyn Exporter) -> Result<CrawlStatistics> {
    let mut coordinator = Coordinator::from_config(config)?;
    crawl_and_export(&mut coordinator, exporter).await
}

/// Crawls with an existing coordinator and exports the result
pub async fn crawl_and_export<S: DocumentSource>(
    coordinator: &mut Coordinator<S>,
    exporter: &dyn Exporter,
) -> Result<CrawlStatistics> {
    let products = match coordinator.run().await {
        Ok(products) => products,
        Err(e) => {
            if let CatalogError::ConnectionFailure { url, attempts, .. } = &e {
                tracing::error!("Crawl aborted at {} after {} requests", url, attempts);
            }
            return Err(e);
        }
    };

    let report = exporter.export(&products)?;
    tracing::info!("Wrote {} rows to {}", report.rows_written, report.destination);

    let mut stats = coordinator.statistics();
    stats.rows_written = report.rows_written;
    Ok(stats)
}
