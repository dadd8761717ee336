//! CSV export of crawled products
//!
//! The file uses `;` as delimiter and `|` as quote character, with one row per
//! product, variant and barcode.

use crate::catalog::{PackagingColumns, Product, Variant, VariantKey};
use crate::output::traits::{ExportReport, Exporter, OutputError, OutputResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Column headers of the export file, in order
pub const CSV_HEADER: [&str; 14] = [
    "Дата и время",
    "Регулярная цена",
    "Акционная цена",
    "Наличие товара",
    "Штрихкод товара",
    "Артикул товара",
    "Наименование товара",
    "Название категории",
    "Страна",
    "Вес",
    "Обьем",
    "Количество единиц",
    "Cсылка на товар",
    "Прямые ссылки фотографии",
];

const DELIMITER: u8 = b';';
const QUOTE: u8 = b'|';
const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";
const IMAGE_SEPARATOR: &str = ",";

/// Writes products to a CSV file, replacing any previous file
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Exporter for CsvExporter {
    fn export(&self, products: &[Product]) -> OutputResult<ExportReport> {
        if self.path.is_dir() {
            return Err(OutputError::Write(format!(
                "{} is a directory",
                self.path.display()
            )));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .quote(QUOTE)
            .from_path(&self.path)?;

        writer.write_record(CSV_HEADER)?;

        let mut rows_written = 0;
        for product in products {
            for (key, variant) in product.variants() {
                for record in product_rows(product, key, variant) {
                    writer.write_record(&record)?;
                    rows_written += 1;
                }
            }
        }

        writer.flush()?;
        tracing::debug!("CSV export finished: {} rows", rows_written);

        Ok(ExportReport {
            rows_written,
            destination: self.path.display().to_string(),
        })
    }
}

/// Builds the records of one variant, one per barcode
///
/// A variant without barcodes still yields a single record with an empty
/// barcode cell.
fn product_rows(product: &Product, key: &VariantKey, variant: &Variant) -> Vec<[String; 14]> {
    let PackagingColumns {
        weight,
        volume,
        quantity,
    } = variant
        .packaging
        .as_ref()
        .map(|p| p.columns())
        .unwrap_or_default();

    let article = variant
        .article
        .as_deref()
        .or(key.article())
        .unwrap_or_default();

    let barcodes: Vec<&str> = if variant.barcodes.is_empty() {
        vec![key.barcode().unwrap_or_default()]
    } else {
        variant.barcodes.iter().map(String::as_str).collect()
    };

    barcodes
        .into_iter()
        .map(|barcode| {
            [
                product.captured_at.format(TIMESTAMP_FORMAT).to_string(),
                variant.price.clone(),
                variant.price_promo.clone().unwrap_or_default(),
                if variant.available { "1" } else { "0" }.to_string(),
                barcode.to_string(),
                article.to_string(),
                product.name.clone(),
                product.category.clone(),
                product.country.clone(),
                weight.clone(),
                volume.clone(),
                quantity.clone(),
                product.link.clone(),
                product.images().join(IMAGE_SEPARATOR),
            ]
        })
        .collect()
}
