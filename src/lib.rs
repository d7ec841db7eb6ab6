//! Site-Corpus: a single-site crawler that builds a text corpus
//!
//! This crate walks every reachable page and embedded document of one site,
//! breadth-first, and produces a deduplicated, ordered corpus of extracted
//! text ready for downstream indexing.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Fatal error type for Site-Corpus operations
///
/// Only errors that prevent a crawl from starting (or its output from being
/// written) end up here. Failures of a single page never do.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid start URL: {0}")]
    StartUrl(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Network-level failures for a single fetch, render or probe
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("URL disallowed by robots.txt: {url}")]
    RobotsDenied { url: String },

    #[error("Render failed for {url}: {message}")]
    Render { url: String, message: String },
}

impl FetchError {
    /// Classifies a reqwest error, separating timeouts from other failures
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Failures of the tabular/PDF/Word extractors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Download failed: {0}")]
    Download(#[from] FetchError),

    #[error("Failed to extract {kind} text: {message}")]
    Parse {
        kind: extract::FileKind,
        message: String,
    },

    #[error("Extraction timed out for {url}")]
    Timeout { url: String },
}

/// Result type alias for Site-Corpus operations
pub type Result<T> = std::result::Result<T, CorpusError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, CrawlReport, Crawler, PageKind, PageResult, SiteMeta};
pub use state::VisitState;
pub use url::{canonicalize, is_recursive_path, same_domain};
