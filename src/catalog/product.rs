//! Product and variant model

use chrono::{DateTime, Local};
use std::fmt;

/// Stable identity of a variant: its `(article, barcode)` pair
///
/// Either half may be missing, but never both: a row with neither an article
/// nor a barcode has no identity and cannot be represented by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantKey {
    article: Option<String>,
    barcode: Option<String>,
}

impl VariantKey {
    /// Builds a key from raw field values; blank values count as missing
    ///
    /// Returns `None` when both fields are blank.
    pub fn new(article: Option<&str>, barcode: Option<&str>) -> Option<Self> {
        let article = non_blank(article);
        let barcode = non_blank(barcode);

        if article.is_none() && barcode.is_none() {
            return None;
        }

        Some(Self { article, barcode })
    }

    pub fn article(&self) -> Option<&str> {
        self.article.as_deref()
    }

    pub fn barcode(&self) -> Option<&str> {
        self.barcode.as_deref()
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})",
            self.article.as_deref().unwrap_or("-"),
            self.barcode.as_deref().unwrap_or("-")
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Packaging of a variant; exactly one measure applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packaging {
    /// Piece count, e.g. "100 шт"
    Quantity(String),
    /// Volume, e.g. "500 мл"
    Volume(String),
    /// Weight, e.g. "2 кг"
    Weight(String),
}

/// Export columns filled from a packaging value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagingColumns {
    pub weight: String,
    pub volume: String,
    pub quantity: String,
}

impl Packaging {
    /// Classifies a packaging label by its unit
    ///
    /// Units are checked in the order pieces, millilitres, grams; "кг" counts as
    /// grams. Labels without a known unit yield `None`.
    pub fn classify(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        if label.contains("шт") {
            Some(Self::Quantity(label.to_string()))
        } else if label.contains("мл") {
            Some(Self::Volume(label.to_string()))
        } else if label.contains('г') {
            Some(Self::Weight(label.to_string()))
        } else {
            None
        }
    }

    /// Places the value into the column matching its unit
    pub fn columns(&self) -> PackagingColumns {
        match self {
            Self::Weight(value) => PackagingColumns {
                weight: value.clone(),
                ..Default::default()
            },
            Self::Volume(value) => PackagingColumns {
                volume: value.clone(),
                ..Default::default()
            },
            Self::Quantity(value) => PackagingColumns {
                quantity: value.clone(),
                ..Default::default()
            },
        }
    }
}

/// One packaging/price offer of a product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub article: Option<String>,

    /// Barcodes printed for this offer; each becomes its own export row
    pub barcodes: Vec<String>,

    /// Regular price as displayed
    pub price: String,

    /// Promotional price, when the regular price is struck through
    pub price_promo: Option<String>,

    /// Whether the offer can be put into the basket
    pub available: bool,

    pub packaging: Option<Packaging>,
}

/// A raw offer row as read from a product page, before identity checks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOffer {
    pub article: String,
    pub barcode: String,
    pub price: String,
    pub price_promo: String,
    pub available: bool,
    pub packaging: String,
}

/// Splits a barcode cell holding one or more barcodes
pub fn split_barcodes(raw: &str) -> Vec<String> {
    let mut barcodes: Vec<String> = Vec::new();
    for code in raw.split(|c: char| c == ',' || c == ';' || c.is_whitespace()) {
        if !code.is_empty() && !barcodes.iter().any(|b| b == code) {
            barcodes.push(code.to_string());
        }
    }
    barcodes
}

/// One catalog item page and the offers recorded from it
#[derive(Debug, Clone)]
pub struct Product {
    pub name: String,

    /// Pipe-delimited category path
    pub category: String,

    pub country: String,

    /// Canonical product URL
    pub link: String,

    images: Vec<String>,

    /// Time the product page was captured
    pub captured_at: DateTime<Local>,

    variants: Vec<(VariantKey, Variant)>,
}

impl Product {
    pub fn new(link: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            category: category.into(),
            country: String::new(),
            link: link.into(),
            images: Vec::new(),
            captured_at: Local::now(),
            variants: Vec::new(),
        }
    }

    /// Adds an image URL unless it is already listed
    pub fn add_image(&mut self, url: impl Into<String>) {
        let url = url.into();
        if !self.images.contains(&url) {
            self.images.push(url);
        }
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Records a variant under its identity, replacing one with the same key
    pub fn insert_variant(&mut self, key: VariantKey, variant: Variant) {
        match self.variants.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = variant,
            None => self.variants.push((key, variant)),
        }
    }

    pub fn variant(&self, key: &VariantKey) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, variant)| variant)
    }

    /// Variants in the order they appeared on the page
    pub fn variants(&self) -> impl Iterator<Item = (&VariantKey, &Variant)> {
        self.variants.iter().map(|(key, variant)| (key, variant))
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
