//! Listing pagination
//!
//! A leaf category lists its products over several result pages. Each page
//! shows its own number in a navigation block next to links to other pages;
//! the walk follows the link labelled `current + 1` until there is none.

use crate::crawler::fetcher::DocumentSource;
use crate::crawler::parser::PageLayout;
use crate::url::resolve_link;
use crate::Result;
use std::collections::HashSet;

/// Collects the product URLs of a leaf category across all result pages
pub struct PaginationWalker<'a, S> {
    source: &'a S,
    layout: &'a PageLayout,
    base_url: &'a str,
}

impl<'a, S: DocumentSource> PaginationWalker<'a, S> {
    /// Creates a walker resolving relative links against `base_url`
    pub fn new(source: &'a S, layout: &'a PageLayout, base_url: &'a str) -> Self {
        Self {
            source,
            layout,
            base_url,
        }
    }

    /// Walks every result page starting at `landing_url`
    ///
    /// Returns absolute product URLs in page order, each listed once. The
    /// walk ends on a page without a listing section, without navigation, or
    /// without a link to the next page number. A page already visited in this
    /// walk is never requested again.
    ///
    /// # Errors
    ///
    /// Propagates `ConnectionFailure` from the document source.
    pub async fn walk(&self, landing_url: &str) -> Result<Vec<String>> {
        let mut product_urls = Vec::new();
        let mut seen_products = HashSet::new();
        let mut visited_pages = HashSet::new();
        let mut cursor = Some(landing_url.to_string());

        while let Some(page_url) = cursor.take() {
            if !visited_pages.insert(page_url.clone()) {
                tracing::warn!("Pagination returned to {}, stopping walk", page_url);
                break;
            }

            let body = self.source.get_document(&page_url).await?;
            let page = self.layout.listing(&body);

            if !page.has_section {
                tracing::warn!("No product listing on {}", page_url);
                break;
            }

            for href in &page.product_links {
                match resolve_link(self.base_url, href) {
                    Ok(url) => {
                        if seen_products.insert(url.clone()) {
                            product_urls.push(url);
                        }
                    }
                    Err(e) => tracing::warn!("Skipping product link on {}: {}", page_url, e),
                }
            }

            cursor = match page.next_page_href() {
                Some(href) => match resolve_link(self.base_url, href) {
                    Ok(next) => Some(next),
                    Err(e) => {
                        tracing::warn!("Cannot follow next page from {}: {}", page_url, e);
                        None
                    }
                },
                None => None,
            };

            tracing::debug!(
                "Listing page {} done, {} product links so far",
                page_url,
                product_urls.len()
            );
        }

        Ok(product_urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CatalogError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BASE: &str = "https://shop.example.com";

    /// Serves fixed pages and records every request
    struct StaticSite {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticSite {
        fn new(pages: Vec<(String, String)>) -> Self {
            Self {
                pages: pages.into_iter().collect(),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl DocumentSource for StaticSite {
        async fn get_document(&self, url: &str) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| CatalogError::ConnectionFailure {
                    url: url.to_string(),
                    restarts: 1,
                    attempts: 1,
                })
        }
    }

    fn listing_page(number: u32, products: &[&str], last: u32) -> String {
        let links: String = products
            .iter()
            .map(|p| format!(r#"<a class="name" href="{}">{}</a>"#, p, p))
            .collect();

        let navigation: String = (1..=last)
            .map(|n| {
                if n == number {
                    format!("<span>{}</span>", n)
                } else {
                    format!(r#"<a href="/c/page-{}/">{}</a>"#, n, n)
                }
            })
            .collect();

        format!(
            r#"<html><body><div class="catalog-section">{}<div class="navigation">{}</div></div></body></html>"#,
            links, navigation
        )
    }

    fn page_url(n: u32) -> String {
        format!("{}/c/page-{}/", BASE, n)
    }

    fn layout() -> PageLayout {
        PageLayout::new("^lvl").unwrap()
    }

    #[tokio::test]
    async fn test_walk_follows_pages_to_the_end() {
        let site = StaticSite::new(vec![
            (page_url(1), listing_page(1, &["/p/1/", "/p/2/"], 4)),
            (page_url(2), listing_page(2, &["/p/3/"], 4)),
            (page_url(3), listing_page(3, &["/p/4/", "/p/5/"], 4)),
            (page_url(4), listing_page(4, &["/p/6/"], 4)),
        ]);
        let layout = layout();

        let walker = PaginationWalker::new(&site, &layout, BASE);
        let urls = walker.walk(&page_url(1)).await.unwrap();

        let expected: Vec<String> = (1..=6).map(|n| format!("{}/p/{}/", BASE, n)).collect();
        assert_eq!(urls, expected);
        assert_eq!(
            site.requests(),
            vec![page_url(1), page_url(2), page_url(3), page_url(4)]
        );
    }

    #[tokio::test]
    async fn test_single_page_without_navigation() {
        let landing = format!("{}/c/?pc=60", BASE);
        let site = StaticSite::new(vec![(
            landing.clone(),
            r#"<div class="catalog-section"><a class="name" href="/p/1/">1</a></div>"#
                .to_string(),
        )]);
        let layout = layout();

        let urls = PaginationWalker::new(&site, &layout, BASE)
            .walk(&landing)
            .await
            .unwrap();

        assert_eq!(urls, vec![format!("{}/p/1/", BASE)]);
        assert_eq!(site.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_product_links_listed_once() {
        let site = StaticSite::new(vec![
            (page_url(1), listing_page(1, &["/p/1/", "/p/2/", "/p/1/"], 2)),
            (page_url(2), listing_page(2, &["/p/2/", "/p/3/"], 2)),
        ]);
        let layout = layout();

        let urls = PaginationWalker::new(&site, &layout, BASE)
            .walk(&page_url(1))
            .await
            .unwrap();

        assert_eq!(
            urls,
            vec![
                format!("{}/p/1/", BASE),
                format!("{}/p/2/", BASE),
                format!("{}/p/3/", BASE)
            ]
        );
    }

    #[tokio::test]
    async fn test_navigation_cycle_terminates() {
        // Page 2 claims to be page 1 and links back to page 2 itself
        let broken = r#"<div class="catalog-section"><a class="name" href="/p/2/">2</a>
            <div class="navigation"><span>1</span><a href="/c/page-2/">2</a></div></div>"#;
        let site = StaticSite::new(vec![
            (page_url(1), listing_page(1, &["/p/1/"], 2)),
            (page_url(2), broken.to_string()),
        ]);
        let layout = layout();

        let urls = PaginationWalker::new(&site, &layout, BASE)
            .walk(&page_url(1))
            .await
            .unwrap();

        assert_eq!(urls.len(), 2);
        assert_eq!(site.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_listing_section_yields_nothing() {
        let site = StaticSite::new(vec![(
            page_url(1),
            "<html><body>Empty category</body></html>".to_string(),
        )]);
        let layout = layout();

        let urls = PaginationWalker::new(&site, &layout, BASE)
            .walk(&page_url(1))
            .await
            .unwrap();

        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let site = StaticSite::new(vec![(page_url(1), listing_page(1, &["/p/1/"], 2))]);
        let layout = layout();

        let result = PaginationWalker::new(&site, &layout, BASE)
            .walk(&page_url(1))
            .await;

        assert!(matches!(
            result,
            Err(CatalogError::ConnectionFailure { url, .. }) if url == page_url(2)
        ));
    }
}
