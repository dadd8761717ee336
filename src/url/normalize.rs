use crate::UrlError;
use url::Url;

/// Query parameters that only carry tracking or listing state
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "yclid",
    "mc_eid",
    "pc",
];

/// Reduces a product URL to its canonical, shareable form
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)
/// 2. Remove fragment (everything after #)
/// 3. Remove tracking query parameters
/// 4. Sort remaining query parameters alphabetically
/// 5. Remove empty query string (trailing ?)
///
/// Scheme, host and path are kept as the site serves them.
///
/// # Examples
///
/// ```
/// use catalog_walker::url::canonical_link;
///
/// let link = canonical_link("https://shop.example.com/catalog/item-1/?utm_source=mail#photos").unwrap();
/// assert_eq!(link, "https://shop.example.com/catalog/item-1/");
/// ```
pub fn canonical_link(url_str: &str) -> Result<String, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url.to_string())
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort_by(|a, b| a.0.cmp(&b.0));

    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_link_unchanged() {
        let result = canonical_link("https://shop.example.com/catalog/dogs/item-7/").unwrap();
        assert_eq!(result, "https://shop.example.com/catalog/dogs/item-7/");
    }

    #[test]
    fn test_remove_fragment() {
        let result = canonical_link("https://shop.example.com/item#reviews").unwrap();
        assert_eq!(result, "https://shop.example.com/item");
    }

    #[test]
    fn test_remove_tracking_and_page_size_params() {
        let result =
            canonical_link("https://shop.example.com/item/?utm_campaign=x&pc=60&yclid=1").unwrap();
        assert_eq!(result, "https://shop.example.com/item/");
    }

    #[test]
    fn test_keep_and_sort_meaningful_params() {
        let result =
            canonical_link("https://shop.example.com/item?offer=2&utm_medium=email&color=red")
                .unwrap();
        assert_eq!(result, "https://shop.example.com/item?color=red&offer=2");
    }

    #[test]
    fn test_identity_params_are_kept() {
        let first = canonical_link("https://shop.example.com/item?ref=7701&utm_source=x").unwrap();
        let second = canonical_link("https://shop.example.com/item?ref=7702").unwrap();

        assert_eq!(first, "https://shop.example.com/item?ref=7701");
        assert_ne!(first, second);

        let result = canonical_link("https://shop.example.com/item?source=farm&pc=30").unwrap();
        assert_eq!(result, "https://shop.example.com/item?source=farm");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = canonical_link("ftp://shop.example.com/item");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_relative_link_rejected() {
        assert!(matches!(
            canonical_link("/catalog/item"),
            Err(UrlError::Parse(_))
        ));
    }
}
