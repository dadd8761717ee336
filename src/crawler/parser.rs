//! HTML parser for catalog pages
//!
//! This module turns the site's pages into plain data:
//! - Top-level menu entries from the home page
//! - Sub-category links from a top-level category's side menu
//! - Product links and pagination from listing pages
//! - Name, country, images and offer rows from product pages
//!
//! Every extractor treats a missing element as an absent value rather than
//! an error; callers decide what to log.

use crate::catalog::RawOffer;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// Prefix in front of the country of origin on product pages
const COUNTRY_PREFIX: &str = "Страна производства: ";

/// Label text of the basket button shown for available offers
const IN_STOCK_LABEL: &str = "В корзину";

const ARTICLE_LABEL: &str = "Артикул:";
const BARCODE_LABEL: &str = "Штрихкод:";
const PACKAGING_LABEL: &str = "Фасовка:";
const PRICE_LABEL: &str = "Цена:";

const OFFER_ROWS: &str = "table.b-catalog-element-offers-table tr.b-catalog-element-offer";

/// Finds the first `tag` element whose `attribute` matches `pattern`
///
/// `pattern` uses search semantics: it may match anywhere in the attribute
/// value. Returns `None` when no such element exists or `tag` is not a valid
/// element name.
///
/// # Example
///
/// ```
/// use catalog_walker::crawler::find_node;
/// use regex::Regex;
/// use scraper::Html;
///
/// let html = Html::parse_document(r#"<div class="menu lvl2"><a>x</a></div>"#);
/// let node = find_node(&html, "div", "class", &Regex::new("lvl[0-9]").unwrap());
/// assert!(node.is_some());
/// ```
pub fn find_node<'a>(
    document: &'a Html,
    tag: &str,
    attribute: &str,
    pattern: &Regex,
) -> Option<ElementRef<'a>> {
    find_in(document.root_element(), tag, attribute, pattern)
}

/// Same as [`find_node`], restricted to the descendants of `scope`
pub fn find_in<'a>(
    scope: ElementRef<'a>,
    tag: &str,
    attribute: &str,
    pattern: &Regex,
) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(tag).ok()?;
    scope.select(&selector).find(|element| {
        element
            .value()
            .attr(attribute)
            .is_some_and(|value| pattern.is_match(value))
    })
}

/// A top-level entry of the main catalog menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    /// Display name (the link's `title`)
    pub name: String,
    pub href: String,
}

/// A pagination link on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub label: String,
    pub href: String,
}

/// What a listing page yields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Whether the listing section was present at all
    pub has_section: bool,

    /// Product hrefs in document order
    pub product_links: Vec<String>,

    /// Page number shown as current in the navigation block
    pub current_page: Option<u32>,

    /// Links of the navigation block
    pub page_links: Vec<PageLink>,
}

impl ListingPage {
    /// Href of the page numbered `current + 1`, if the navigation offers it
    pub fn next_page_href(&self) -> Option<&str> {
        let next = self.current_page?.checked_add(1)?;
        self.page_links
            .iter()
            .find(|link| link.label.trim().parse::<u32>().ok() == Some(next))
            .map(|link| link.href.as_str())
    }
}

/// What a product page yields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPage {
    /// Whether the product detail block was present at all
    pub has_detail: bool,
    pub name: Option<String>,
    pub country: Option<String>,

    /// Image hrefs in document order, possibly repeated
    pub image_hrefs: Vec<String>,

    pub offers: Vec<RawOffer>,
}

/// Element patterns of the catalog site
#[derive(Debug, Clone)]
pub struct PageLayout {
    main_menu: Regex,
    side_menu: Regex,
    sub_menu_link: Regex,
    listing_section: Regex,
    product_detail: Regex,
}

impl PageLayout {
    /// Creates the layout; `sub_menu_pattern` selects side-menu links by class
    pub fn new(sub_menu_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            main_menu: Regex::new("^catalog-menu$")?,
            side_menu: class_token("catalog-menu-left")?,
            sub_menu_link: Regex::new(sub_menu_pattern)?,
            listing_section: class_token("catalog-section")?,
            product_detail: class_token("catalog-detail")?,
        })
    }

    /// Extracts the top-level categories from the home page
    pub fn main_menu(&self, html: &str) -> Vec<MenuEntry> {
        let document = Html::parse_document(html);
        let Some(menu) = find_node(&document, "div", "id", &self.main_menu) else {
            return Vec::new();
        };
        let Ok(icon) = Selector::parse("a.catalog-menu-icon") else {
            return Vec::new();
        };

        menu.select(&icon)
            .filter_map(|link| {
                let name = link.value().attr("title")?.trim();
                let href = link.value().attr("href")?.trim();
                Some(MenuEntry {
                    name: name.to_string(),
                    href: href.to_string(),
                })
            })
            .collect()
    }

    /// Extracts `(href, name)` pairs of the sub-categories in the side menu
    pub fn sub_categories(&self, html: &str) -> Vec<(String, String)> {
        let document = Html::parse_document(html);
        let Some(menu) = find_node(&document, "div", "class", &self.side_menu) else {
            return Vec::new();
        };
        let Ok(link) = Selector::parse("a") else {
            return Vec::new();
        };

        menu.select(&link)
            .filter(|a| {
                a.value()
                    .attr("class")
                    .is_some_and(|class| self.sub_menu_link.is_match(class))
            })
            .filter_map(|a| {
                let href = a.value().attr("href")?.trim();
                Some((href.to_string(), text_of(a)))
            })
            .collect()
    }

    /// Extracts product links and pagination from a listing page
    pub fn listing(&self, html: &str) -> ListingPage {
        let document = Html::parse_document(html);
        let Some(section) = find_node(&document, "div", "class", &self.listing_section) else {
            return ListingPage::default();
        };

        let mut page = ListingPage {
            has_section: true,
            ..Default::default()
        };

        if let Ok(product) = Selector::parse("a.name") {
            page.product_links = section
                .select(&product)
                .filter_map(|a| a.value().attr("href"))
                .map(|href| href.trim().to_string())
                .collect();
        }

        let navigation = Selector::parse("div.navigation")
            .ok()
            .and_then(|selector| section.select(&selector).next());

        if let Some(navigation) = navigation {
            page.current_page = first_text(navigation, "span").and_then(|t| t.parse().ok());

            if let Ok(link) = Selector::parse("a[href]") {
                page.page_links = navigation
                    .select(&link)
                    .filter_map(|a| {
                        Some(PageLink {
                            label: text_of(a),
                            href: a.value().attr("href")?.trim().to_string(),
                        })
                    })
                    .collect();
            }
        }

        page
    }

    /// Extracts the fields of a product page
    pub fn product(&self, html: &str) -> ProductPage {
        let document = Html::parse_document(html);
        let Some(detail) = find_node(&document, "div", "class", &self.product_detail) else {
            return ProductPage::default();
        };

        let name = first_text(detail, "div.catalog-element-right h1").filter(|n| !n.is_empty());

        let country = first_text(detail, "div.catalog-element-offer-left p")
            .map(|text| text.replace(COUNTRY_PREFIX, "").trim().to_string())
            .filter(|c| !c.is_empty());

        let image_hrefs: Vec<String> = Selector::parse("a[rel=groupimg]")
            .map(|selector| {
                detail
                    .select(&selector)
                    .filter_map(|a| a.value().attr("href"))
                    .map(|href| href.trim().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let offers: Vec<RawOffer> = Selector::parse(OFFER_ROWS)
            .map(|selector| detail.select(&selector).map(parse_offer_row).collect())
            .unwrap_or_default();

        ProductPage {
            has_detail: true,
            name,
            country,
            image_hrefs,
            offers,
        }
    }
}

/// Builds a pattern matching one whole class token
fn class_token(class: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(^|\s){}(\s|$)", regex::escape(class)))
}

/// Reads one offer row of the product table
fn parse_offer_row(row: ElementRef<'_>) -> RawOffer {
    let (price, price_promo) = parse_price(row);

    RawOffer {
        article: labelled_value(row, ARTICLE_LABEL).unwrap_or_default(),
        barcode: labelled_value(row, BARCODE_LABEL).unwrap_or_default(),
        price,
        price_promo,
        available: has_text(row, "span", IN_STOCK_LABEL),
        packaging: labelled_value(row, PACKAGING_LABEL).unwrap_or_default(),
    }
}

/// Regular and promotional price of an offer row
///
/// A struck-through `<s>` price is the regular one and the `<span>` next to it
/// the promotion; without `<s>` the `<span>` is the regular price.
fn parse_price(row: ElementRef<'_>) -> (String, String) {
    let Some(block) = label_parent(row, PRICE_LABEL) else {
        return (String::new(), String::new());
    };

    let current = first_text(block, "span").unwrap_or_default();
    match first_text(block, "s") {
        Some(regular) => (regular, current),
        None => (current, String::new()),
    }
}

/// Element wrapping the `<b>label</b>` marker
fn label_parent<'a>(scope: ElementRef<'a>, label: &str) -> Option<ElementRef<'a>> {
    let bold = Selector::parse("b").ok()?;
    let marker = scope.select(&bold).find(|b| text_of(*b) == label)?;
    marker.parent().and_then(ElementRef::wrap)
}

/// Value printed in the second `<b>` next to a `<b>label</b>` marker
fn labelled_value(scope: ElementRef<'_>, label: &str) -> Option<String> {
    let block = label_parent(scope, label)?;
    let bold = Selector::parse("b").ok()?;
    block.select(&bold).nth(1).map(text_of)
}

fn has_text(scope: ElementRef<'_>, css: &str, text: &str) -> bool {
    Selector::parse(css)
        .map(|selector| scope.select(&selector).any(|e| text_of(e) == text))
        .unwrap_or(false)
}

fn first_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next().map(text_of)
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
