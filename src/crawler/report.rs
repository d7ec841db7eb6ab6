//! Crawl results and report aggregation

use crate::extract::FileKind;
use crate::state::VisitState;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Kind of a recorded result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Html,
    Csv,
    Xlsx,
    Pdf,
    Docx,
    Error,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Error => "error",
        }
    }
}

impl From<FileKind> for PageKind {
    fn from(kind: FileKind) -> Self {
        match kind {
            FileKind::Csv => Self::Csv,
            FileKind::Xlsx => Self::Xlsx,
            FileKind::Pdf => Self::Pdf,
            FileKind::Docx => Self::Docx,
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the corpus; never mutated after it is appended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    /// Final URL for HTML pages, the dequeued URL otherwise
    pub url: String,
    pub depth: u32,
    pub kind: PageKind,
    /// Extracted text; `None` for error results
    pub text: Option<String>,
    pub html: Option<String>,
    pub markdown: Option<String>,
    /// JSON-LD blocks found on the page
    pub structured_data: Vec<serde_json::Value>,
    /// Failure message for error results
    pub error: Option<String>,
}

impl PageResult {
    /// Builds an error result for a target that failed to fetch or extract
    pub fn error(url: impl Into<String>, depth: u32, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth,
            kind: PageKind::Error,
            text: None,
            html: None,
            markdown: None,
            structured_data: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// Builds a result for an extracted document
    pub fn file(url: impl Into<String>, depth: u32, kind: FileKind, text: String) -> Self {
        Self {
            url: url.into(),
            depth,
            kind: kind.into(),
            text: Some(text),
            html: None,
            markdown: None,
            structured_data: Vec::new(),
            error: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == PageKind::Error
    }
}

/// Site-level metadata captured from the first rendered HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteMeta {
    pub title: String,
    pub description: String,
    pub favicon_url: String,
}

/// A dequeued target and the decision made for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitRecord {
    pub url: String,
    pub depth: u32,
    pub state: VisitState,
}

/// Counters collected while crawling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    /// Targets dequeued and fetched
    pub pages_visited: u64,
    pub html_pages: u64,
    pub file_pages: u64,
    pub duplicates: u64,
    pub low_quality: u64,
    pub errors: u64,
    pub skipped_revisit: u64,
    pub skipped_recursive: u64,
    pub skipped_off_domain: u64,
    /// Links extracted from accepted or filtered pages
    pub links_discovered: u64,
    pub links_enqueued: u64,
    pub probes: u64,
    pub aliases_collapsed: u64,
    pub queue_truncations: u64,
}

impl CrawlStats {
    /// Results recorded (accepted pages, files and errors)
    pub fn results(&self) -> u64 {
        self.html_pages + self.file_pages + self.errors
    }
}

/// Final output of a crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub start_url: String,
    pub results: Vec<PageResult>,
    /// Every dequeued-and-fetched URL, in visitation order
    pub urls_seen: Vec<String>,
    pub visits: Vec<VisitRecord>,
    pub combined_text: String,
    pub site_meta: SiteMeta,
    pub stats: CrawlStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// True when the crawl was stopped by its caller
    pub cancelled: bool,
}

impl CrawlReport {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Joins the non-empty result texts into the corpus
pub fn combine_text(results: &[PageResult]) -> String {
    results
        .iter()
        .filter_map(|r| r.text.as_deref())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}
