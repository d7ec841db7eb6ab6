use serde::Deserialize;

/// Path markers that keep a page out of the results while still crawling through it
pub const DEFAULT_LOW_QUALITY_PATTERNS: &[&str] = &[
    "contact",
    "privacy",
    "terms",
    "login",
    "disclaimer",
    "account",
    "signup",
    "legal",
    "policy",
    "adult",
    "violence",
    "complaints",
    "report",
    "abuse",
];

/// Main configuration structure for Site-Corpus
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub timeouts: TimeoutConfig,
    pub render: RenderConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the start URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of results kept in the report
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Restrict traversal to the start host and its subdomains
    #[serde(rename = "same-domain-only")]
    pub same_domain_only: bool,

    /// Number of fetches allowed in flight at once
    pub concurrency: usize,

    /// A path segment may repeat this many times before the URL is treated as a loop
    #[serde(rename = "recursion-threshold")]
    pub recursion_threshold: usize,

    /// Probe candidate links for redirects before enqueueing them
    #[serde(rename = "probe-redirects")]
    pub probe_redirects: bool,

    /// Substrings that suppress a page from the results
    #[serde(rename = "low-quality-patterns")]
    pub low_quality_patterns: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            max_pages: 6000,
            same_domain_only: true,
            concurrency: 1,
            recursion_threshold: 2,
            probe_redirects: true,
            low_quality_patterns: DEFAULT_LOW_QUALITY_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

/// Per-operation timeouts, in milliseconds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    #[serde(rename = "render-ms")]
    pub render_ms: u64,

    #[serde(rename = "probe-ms")]
    pub probe_ms: u64,

    #[serde(rename = "download-ms")]
    pub download_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            render_ms: 30_000,
            probe_ms: 3_000,
            download_ms: 10_000,
        }
    }
}

/// Options handed to the page renderer on every call
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Tags removed before markdown generation
    #[serde(rename = "excluded-tags")]
    pub excluded_tags: Vec<String>,

    /// Comma-separated CSS selectors removed before markdown generation
    #[serde(rename = "excluded-selector")]
    pub excluded_selector: String,

    /// Honor robots.txt directives
    #[serde(rename = "check-robots-txt")]
    pub check_robots_txt: bool,

    /// Always fetch fresh content
    #[serde(rename = "bypass-cache")]
    pub bypass_cache: bool,

    /// Scroll the whole page before extraction (headless renderers only)
    #[serde(rename = "scan-full-page")]
    pub scan_full_page: bool,

    /// Minimum body word count; 0 keeps short pages
    #[serde(rename = "word-count-threshold")]
    pub word_count_threshold: usize,

    /// Scripts run before extraction to expand tabs and accordions (headless renderers only)
    #[serde(rename = "interaction-script")]
    pub interaction_script: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            excluded_tags: ["script", "style", "nav", "footer", "header"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            excluded_selector: "#ads, .sidebar, .footer, .header".to_string(),
            check_robots_txt: true,
            bypass_cache: true,
            scan_full_page: true,
            word_count_threshold: 0,
            interaction_script: vec![
                "document.querySelectorAll('[role=\"tab\"], .tab, .tab-button, .accordion, .toggle, .show-more, .expander').forEach(el=>el.click());".to_string(),
                "window.scrollTo(0, document.body.scrollHeight);".to_string(),
            ],
        }
    }
}

impl RenderConfig {
    /// Splits the excluded selector list into individual selectors
    pub fn excluded_selectors(&self) -> Vec<&str> {
        self.excluded_selector
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler, also used as the robots.txt agent token
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SiteCorpus".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Output configuration; each writer runs only when its path is set
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Combined corpus text file
    #[serde(rename = "corpus-path")]
    pub corpus_path: Option<String>,

    /// Full JSON report
    #[serde(rename = "report-path")]
    pub report_path: Option<String>,

    /// Markdown summary
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,

    /// SQLite archive of finished reports
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}
