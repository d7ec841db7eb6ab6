use url::Url;

/// Extracts the lowercase host from a URL string
///
/// # Examples
///
/// ```
/// use site_corpus::url::extract_host;
///
/// assert_eq!(extract_host("https://EXAMPLE.COM/path"), Some("example.com".to_string()));
/// assert_eq!(extract_host("https://example.com:8080/"), Some("example.com".to_string()));
/// assert_eq!(extract_host("not a url"), None);
/// ```
pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.to_lowercase())
}

/// Checks whether a URL stays within the crawl's starting domain
///
/// True iff the URL's host is `base_host` itself or any subdomain of it.
/// Ports are ignored; only the host takes part in the comparison.
///
/// # Examples
///
/// ```
/// use site_corpus::url::same_domain;
///
/// assert!(same_domain("https://site.com/a", "site.com"));
/// assert!(same_domain("https://blog.site.com/a", "site.com"));
/// assert!(!same_domain("https://other.com/a", "site.com"));
/// assert!(!same_domain("https://notsite.com/a", "site.com"));
/// ```
pub fn same_domain(url: &str, base_host: &str) -> bool {
    let base_host = base_host.to_lowercase();
    match extract_host(url) {
        Some(host) => host == base_host || host.ends_with(&format!(".{}", base_host)),
        None => false,
    }
}
