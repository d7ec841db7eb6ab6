use std::collections::HashMap;
use url::Url;

/// Detects looping, generator-style paths
///
/// The path is split into non-empty segments; if any segment value occurs
/// more than `repeat_threshold` times the URL is treated as a self-referential
/// artifact (`/a/b/a/b/a/b/`, `/2025/10/28/2025/10/28/2025/`) and should not
/// be crawled.
///
/// Accepts either a full URL or a bare path. Anything unparseable is not
/// considered recursive.
///
/// # Examples
///
/// ```
/// use site_corpus::url::is_recursive_path;
///
/// assert!(is_recursive_path("/a/b/a/b/a/b/", 2));
/// assert!(!is_recursive_path("/a/b/c/", 2));
/// assert!(!is_recursive_path("https://example.com/a/b/a/b/", 2));
/// ```
pub fn is_recursive_path(url: &str, repeat_threshold: usize) -> bool {
    let path = if url.starts_with('/') {
        strip_query_and_fragment(url).to_string()
    } else {
        match Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => return false,
        }
    };

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let count = counts.entry(segment).or_insert(0);
        *count += 1;
        if *count > repeat_threshold {
            return true;
        }
    }

    false
}

fn strip_query_and_fragment(path: &str) -> &str {
    match path.find(['?', '#']) {
        Some(idx) => &path[..idx],
        None => path,
    }
}
