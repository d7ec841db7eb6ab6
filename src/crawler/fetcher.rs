//! Page rendering
//!
//! This module handles fetching HTML targets, including:
//! - Building the shared HTTP client with the crawler user agent
//! - The `Renderer` contract the frontier depends on
//! - A static HTTP renderer honoring robots.txt and cache bypass
//! - Removing excluded tags/regions before markdown generation

use crate::config::{RenderConfig, UserAgentConfig};
use crate::robots::RobotsCache;
use crate::url::origin_of;
use crate::FetchError;
use async_trait::async_trait;
use htmd::element_handler::{HandlerResult, Handlers};
use htmd::{Element, HtmlToMarkdown};
use lol_html::{element, HtmlRewriter, Settings};
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::time::Duration;

/// Per-call rendering knobs
///
/// Headless renderers use every field; the static `HttpRenderer` has no
/// script engine and ignores `interaction_script` and `scan_full_page`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub excluded_tags: Vec<String>,
    pub excluded_selectors: Vec<String>,
    pub check_robots_txt: bool,
    pub bypass_cache: bool,
    pub scan_full_page: bool,
    pub word_count_threshold: usize,
    pub interaction_script: Vec<String>,
}

impl RenderOptions {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            excluded_tags: config.excluded_tags.clone(),
            excluded_selectors: config
                .excluded_selectors()
                .into_iter()
                .map(str::to_string)
                .collect(),
            check_robots_txt: config.check_robots_txt,
            bypass_cache: config.bypass_cache,
            scan_full_page: config.scan_full_page,
            word_count_threshold: config.word_count_threshold,
            interaction_script: config.interaction_script.clone(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

/// A rendered HTML page
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    /// False when the renderer produced no usable page
    pub success: bool,
    /// Full HTML of the page
    pub html: String,
    /// Markdown generated from the page body, if any
    pub markdown: Option<String>,
    /// URL the page was finally served from (after redirects)
    pub response_url: String,
    /// Renderer-provided metadata (`title`, `description`, ...)
    pub metadata: HashMap<String, String>,
}

/// Page rendering collaborator
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<RenderedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// The user agent has the form `CrawlerName/Version (+ContactURL)`.
/// Redirects are followed (up to 10 hops) so callers see the final URL.
/// Request timeouts are set per call.
///
/// # Example
///
/// ```no_run
/// use site_corpus::config::UserAgentConfig;
/// use site_corpus::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Static HTML renderer over reqwest
pub struct HttpRenderer {
    client: Client,
    robots: RobotsCache,
    /// Agent token matched against robots.txt groups
    agent_token: String,
}

impl HttpRenderer {
    pub fn new(client: Client, agent_token: impl Into<String>) -> Self {
        Self {
            client,
            robots: RobotsCache::new(),
            agent_token: agent_token.into(),
        }
    }

    async fn check_robots(&self, url: &str) -> Result<(), FetchError> {
        let Some(origin) = origin_of(url) else {
            return Ok(());
        };

        let rules = self.robots.rules_for(&self.client, &origin).await;
        if rules.is_allowed(url, &self.agent_token) {
            Ok(())
        } else {
            Err(FetchError::RobotsDenied {
                url: url.to_string(),
            })
        }
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &str, options: &RenderOptions) -> Result<RenderedPage, FetchError> {
        if options.check_robots_txt {
            self.check_robots(url).await?;
        }

        if options.scan_full_page || !options.interaction_script.is_empty() {
            tracing::trace!("Static renderer skips page interaction for {}", url);
        }

        let mut request = self.client.get(url);
        if options.bypass_cache {
            request = request
                .header(CACHE_CONTROL, "no-cache")
                .header(PRAGMA, "no-cache");
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        if !is_textual(&content_type) {
            return Err(FetchError::Render {
                url: url.to_string(),
                message: format!("unsupported content type '{}'", content_type),
            });
        }

        let response_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let markdown = match strip_excluded(&html, options) {
            Ok(stripped) => page_markdown(&stripped)
                .map_err(|e| tracing::debug!("Markdown conversion failed for {}: {}", url, e))
                .ok(),
            Err(message) => {
                tracing::debug!("Failed to strip excluded regions for {}: {}", url, message);
                None
            }
        };

        let mut metadata = HashMap::new();
        metadata.insert("status-code".to_string(), status.as_u16().to_string());
        if !content_type.is_empty() {
            metadata.insert("content-type".to_string(), content_type);
        }

        Ok(RenderedPage {
            success: true,
            html,
            markdown,
            response_url,
            metadata,
        })
    }
}

/// Converts HTML to markdown without link or image targets
///
/// Anchors keep only their text and images only their alt text, so pages
/// that differ only in where their links point produce identical markdown.
pub fn page_markdown(html: &str) -> std::io::Result<String> {
    HtmlToMarkdown::builder()
        .add_handler(vec!["a"], |handlers: &dyn Handlers, element: Element| {
            Some(handlers.walk_children(element.node))
        })
        .add_handler(vec!["img"], |_: &dyn Handlers, element: Element| {
            element
                .attrs
                .iter()
                .find(|attr| &*attr.name.local == "alt")
                .map(|attr| attr.value.trim())
                .filter(|alt| !alt.is_empty())
                .map(HandlerResult::from)
        })
        .build()
        .convert(html)
}

fn is_textual(content_type: &str) -> bool {
    content_type.is_empty()
        || content_type.contains("html")
        || content_type.contains("xml")
        || content_type.starts_with("text/")
}

/// Removes excluded tags and selector matches from an HTML document
///
/// Selectors that fail to parse are reported instead of being applied.
pub fn strip_excluded(html: &str, options: &RenderOptions) -> Result<String, String> {
    let selectors: Vec<&str> = options
        .excluded_tags
        .iter()
        .chain(options.excluded_selectors.iter())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    for selector in &selectors {
        selector
            .parse::<lol_html::Selector>()
            .map_err(|e| format!("invalid selector '{}': {}", selector, e))?;
    }

    let handlers = selectors
        .iter()
        .map(|selector| {
            element!(selector, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    let mut output = Vec::with_capacity(html.len());
    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: handlers,
            ..Settings::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| format!("HTML rewrite error: {}", e))?;
    rewriter
        .end()
        .map_err(|e| format!("HTML rewrite finalization error: {}", e))?;

    String::from_utf8(output).map_err(|e| format!("Invalid UTF-8 in rewritten HTML: {}", e))
}
