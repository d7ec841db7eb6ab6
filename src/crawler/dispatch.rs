//! Content dispatch by path extension

use crate::extract::FileKind;
use url::Url;

/// Where a dequeued URL is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Rendered page
    Html,
    /// Direct file handed to a document extractor; never rendered
    File(FileKind),
}

/// Classifies a URL as a renderable page or a direct file
///
/// Only the path is inspected, so query strings and fragments do not affect
/// the decision (`/data.csv?download=1` is a CSV file).
pub fn classify(url: &str) -> Target {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    match FileKind::from_path(&path) {
        Some(kind) => Target::File(kind),
        None => Target::Html,
    }
}
