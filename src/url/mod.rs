//! URL handling module for Site-Corpus
//!
//! This module provides URL canonicalization, looping-path detection and
//! domain scoping for the frontier.

mod domain;
mod normalize;
mod recursion;

// Re-export main functions
pub use domain::{extract_host, same_domain};
pub use normalize::{canonicalize, origin_of, strip_fragment};
pub use recursion::is_recursive_path;

/// Returns true if any low-quality marker occurs in the URL (case-insensitive)
///
/// Matching pages are kept out of the results, but their links are still
/// followed.
///
/// # Examples
///
/// ```
/// use site_corpus::url::is_low_quality;
///
/// let patterns = vec!["login".to_string(), "privacy".to_string()];
/// assert!(is_low_quality("https://example.com/Login", &patterns));
/// assert!(!is_low_quality("https://example.com/docs", &patterns));
/// ```
pub fn is_low_quality(url: &str, patterns: &[String]) -> bool {
    let lowered = url.to_lowercase();
    patterns
        .iter()
        .any(|pattern| lowered.contains(&pattern.to_lowercase()))
}
