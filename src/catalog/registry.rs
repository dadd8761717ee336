//! Run-wide variant deduplication
//!
//! The same offer is often listed in several categories. The registry keeps
//! every `(article, barcode)` pair emitted during a crawl run so that each pair
//! is exported at most once, no matter which page it shows up on.

use crate::catalog::product::{split_barcodes, Packaging, Product, RawOffer, Variant, VariantKey};
use std::collections::HashSet;

/// Set of variant identities already emitted during one crawl run
#[derive(Debug, Default)]
pub struct ProductRegistry {
    seen: HashSet<VariantKey>,
}

impl ProductRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &VariantKey) -> bool {
        self.seen.contains(key)
    }

    /// Registers a key; returns `false` if it was already present
    pub fn insert(&mut self, key: VariantKey) -> bool {
        self.seen.insert(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Counters kept by the aggregator over a crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregatorStats {
    /// Variants recorded into products
    pub recorded: usize,

    /// Rows dropped for carrying neither article nor barcode
    pub skipped_without_identity: usize,

    /// Rows dropped because every identity was already emitted
    pub skipped_duplicates: usize,
}

/// Turns raw offer rows into deduplicated product variants
#[derive(Debug, Default)]
pub struct ProductAggregator {
    registry: ProductRegistry,
    stats: AggregatorStats,
}

impl ProductAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ProductRegistry {
        &self.registry
    }

    pub fn stats(&self) -> AggregatorStats {
        self.stats
    }

    /// Records the offers of one product page into `product`
    ///
    /// A row without article and barcode is skipped. Otherwise every
    /// `(article, barcode)` pair the row would export is checked against the
    /// run-wide registry: pairs already emitted are dropped, and the row is
    /// skipped when none remain. Surviving rows keep only their fresh
    /// barcodes.
    pub fn aggregate(&mut self, product: &mut Product, offers: Vec<RawOffer>) {
        for offer in offers {
            let article = offer.article.trim();
            let barcodes = split_barcodes(&offer.barcode);

            let first_barcode = barcodes.first().map(String::as_str);
            let Some(primary) = VariantKey::new(Some(article), first_barcode) else {
                tracing::debug!("Skipping offer without identity on {}", product.link);
                self.stats.skipped_without_identity += 1;
                continue;
            };

            let (key, fresh_barcodes) = if barcodes.is_empty() {
                if !self.registry.insert(primary.clone()) {
                    self.skip_duplicate(product, &primary);
                    continue;
                }
                (primary, Vec::new())
            } else {
                let mut fresh = Vec::new();
                let mut first_key = None;
                for barcode in barcodes {
                    let Some(key) = VariantKey::new(Some(article), Some(&barcode)) else {
                        continue;
                    };
                    if self.registry.insert(key.clone()) {
                        first_key.get_or_insert(key);
                        fresh.push(barcode);
                    }
                }

                match first_key {
                    Some(key) => (key, fresh),
                    None => {
                        self.skip_duplicate(product, &primary);
                        continue;
                    }
                }
            };

            let variant = Variant {
                article: key.article().map(str::to_string),
                barcodes: fresh_barcodes,
                price: offer.price.trim().to_string(),
                price_promo: Some(offer.price_promo.trim())
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
                available: offer.available,
                packaging: Packaging::classify(&offer.packaging),
            };

            product.insert_variant(key, variant);
            self.stats.recorded += 1;
        }
    }

    fn skip_duplicate(&mut self, product: &Product, key: &VariantKey) {
        tracing::debug!("Skipping already emitted offer {} on {}", key, product.link);
        self.stats.skipped_duplicates += 1;
    }
}
