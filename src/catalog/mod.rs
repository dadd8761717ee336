//! Catalog data model
//!
//! - `Category` / `CategoryHierarchy`: category discovery results and their
//!   resolution into leaf categories
//! - `Product` / `Variant`: what a product page yields
//! - `ProductRegistry` / `ProductAggregator`: run-wide offer deduplication

mod category;
mod product;
mod registry;

pub use category::{Category, CategoryHierarchy, LeafCategory, PATH_SEPARATOR};
pub use product::{
    split_barcodes, Packaging, PackagingColumns, Product, RawOffer, Variant, VariantKey,
};
pub use registry::{AggregatorStats, ProductAggregator, ProductRegistry};
