//! Crawler module for site traversal and page processing
//!
//! This module contains the core crawling logic, including:
//! - The breadth-first frontier and its visit bookkeeping
//! - HTML rendering and document dispatch
//! - Text, link, metadata and JSON-LD extraction
//! - Redirect probing for alias collapse
//! - Overall crawl coordination and report aggregation

mod coordinator;
mod dispatch;
mod fetcher;
mod frontier;
mod parser;
mod report;
mod resolver;

pub use coordinator::Crawler;
pub use dispatch::{classify, Target};
pub use fetcher::{
    build_http_client, page_markdown, strip_excluded, HttpRenderer, RenderOptions, RenderedPage,
    Renderer,
};
pub use frontier::{CrawlTarget, Frontier};
pub use parser::{
    clean_text, content_signature, extract_json_ld, extract_links, extract_site_meta,
    fallback_site_meta,
};
pub use report::{
    combine_text, CrawlReport, CrawlStats, PageKind, PageResult, SiteMeta, VisitRecord,
};
pub use resolver::{resolve_final, HttpProber, ProbeResponse, Prober};

use crate::config::Config;
use crate::CorpusError;
use tokio_util::sync::CancellationToken;

/// Crawls a site with the HTTP collaborators
///
/// This is the main entry point for a one-shot crawl. It will:
/// 1. Validate the configuration
/// 2. Build the shared HTTP client, renderer, prober and extractor
/// 3. Traverse the site breadth-first from `start_url`
/// 4. Return the ordered, deduplicated report
///
/// Use [`Crawler`] directly to supply other collaborators or a
/// cancellation token.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `start_url` - Absolute http(s) URL the crawl starts from
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed, possibly with per-page errors
/// * `Err(CorpusError)` - Invalid configuration, start URL or HTTP client
///
/// # Example
///
/// ```no_run
/// use site_corpus::{crawl, Config};
///
/// # async fn example() -> Result<(), site_corpus::CorpusError> {
/// let report = crawl(Config::default(), "https://example.com/").await?;
/// println!("{}", report.combined_text);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config, start_url: &str) -> Result<CrawlReport, CorpusError> {
    Crawler::from_config(config)?
        .crawl(start_url, CancellationToken::new())
        .await
}
