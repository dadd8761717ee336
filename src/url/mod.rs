//! URL handling for catalog links
//!
//! Catalog pages reference each other with site-relative hrefs. This module
//! resolves them against the configured site URL, builds listing URLs and
//! reduces product URLs to their canonical form.

mod normalize;

pub use normalize::canonical_link;

use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves an href found on a catalog page against the site base URL
///
/// Absolute hrefs are returned unchanged (apart from URL serialization).
pub fn resolve_link(base: &str, href: &str) -> UrlResult<String> {
    let href = href.trim();
    let base_url = Url::parse(base).map_err(|e| UrlError::Parse(e.to_string()))?;

    let resolved = base_url.join(href).map_err(|_| UrlError::Unresolvable {
        base: base.to_string(),
        href: href.to_string(),
    })?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return Err(UrlError::InvalidScheme(resolved.scheme().to_string()));
    }

    Ok(resolved.to_string())
}

/// Builds the landing URL of a leaf category listing
///
/// The `pc` parameter asks the site for `page_size` products per page, which
/// keeps the number of pagination requests low.
pub fn listing_url(base: &str, category_href: &str, page_size: u32) -> UrlResult<String> {
    let resolved = resolve_link(base, category_href)?;
    let mut url = Url::parse(&resolved).map_err(|e| UrlError::Parse(e.to_string()))?;
    url.query_pairs_mut().append_pair("pc", &page_size.to_string());
    Ok(url.to_string())
}
