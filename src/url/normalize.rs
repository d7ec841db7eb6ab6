use crate::UrlError;
use url::Url;

/// Canonicalizes a URL for equality comparisons
///
/// # Canonicalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Resolve relative references against `base` (if given)
/// 3. Reject anything that is not HTTP(S) or has no host
/// 4. Lowercase the scheme and host (path, query and fragment keep their case)
/// 5. Drop an empty fragment (`page#` is `page`)
///
/// Non-empty fragments are preserved: hash-routed applications encode
/// distinct logical pages there, so `/a#2024` and `/a#2025` are different
/// crawl targets.
///
/// Canonicalizing an already-canonical URL returns the same string.
///
/// # Arguments
///
/// * `raw` - The URL or reference to canonicalize
/// * `base` - Optional base URL for relative references
///
/// # Examples
///
/// ```
/// use site_corpus::url::canonicalize;
///
/// let url = canonicalize("HTTPS://Example.COM/Page#Top", None).unwrap();
/// assert_eq!(url, "https://example.com/Page#Top");
///
/// let url = canonicalize("../b?x=1", Some("https://example.com/a/c")).unwrap();
/// assert_eq!(url, "https://example.com/b?x=1");
/// ```
pub fn canonicalize(raw: &str, base: Option<&str>) -> Result<String, UrlError> {
    let raw = raw.trim();

    let mut url = match base {
        Some(base) => {
            let base = Url::parse(base.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
            base.join(raw).map_err(|e| UrlError::Parse(e.to_string()))?
        }
        None => Url::parse(raw).map_err(|e| UrlError::Parse(e.to_string()))?,
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    if host.is_empty() {
        return Err(UrlError::MissingHost);
    }
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;

    if url.fragment() == Some("") {
        url.set_fragment(None);
    }

    Ok(url.to_string())
}

/// Returns the URL with its fragment removed
///
/// Used to tell whether a link is just a fragment variant of another URL.
pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(idx) => &url[..idx],
        None => url,
    }
}

/// Returns the `scheme://host[:port]` origin of a URL
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.origin() {
        origin @ url::Origin::Tuple(..) => Some(origin.ascii_serialization()),
        url::Origin::Opaque(_) => None,
    }
}
