//! Document extraction for direct file links
//!
//! File-kind URLs never go through the page renderer. They are downloaded
//! and handed to a format-specific text extractor:
//! - CSV and XLSX become a markdown table
//! - PDF yields its text layer
//! - DOCX yields its paragraph text

mod docx;
mod pdf;
mod tabular;

pub use docx::docx_to_text;
pub use pdf::pdf_to_text;
pub use tabular::{csv_to_markdown, xlsx_to_markdown};

use crate::{ExtractError, FetchError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Kinds of documents extracted without rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Csv,
    Xlsx,
    Pdf,
    Docx,
}

impl FileKind {
    /// All supported kinds, in dispatch order
    pub const ALL: [FileKind; 4] = [Self::Csv, Self::Xlsx, Self::Pdf, Self::Docx];

    /// The lowercase path extension (with leading dot) for this kind
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Xlsx => ".xlsx",
            Self::Pdf => ".pdf",
            Self::Docx => ".docx",
        }
    }

    /// Matches a path against the supported extensions (case-insensitive)
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| path.ends_with(kind.extension()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns a document URL into text
///
/// Each call is independently failable; the crawler records a failure as an
/// error result and moves on.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, url: &str, kind: FileKind) -> Result<String, ExtractError>;
}

/// Extracts text from raw document bytes
pub fn extract_bytes(kind: FileKind, bytes: &[u8]) -> Result<String, ExtractError> {
    match kind {
        FileKind::Csv => csv_to_markdown(bytes),
        FileKind::Xlsx => xlsx_to_markdown(bytes),
        FileKind::Pdf => pdf_to_text(bytes),
        FileKind::Docx => docx_to_text(bytes),
    }
}

/// Downloads documents over HTTP and extracts them in a blocking task
#[derive(Debug, Clone)]
pub struct HttpDocumentExtractor {
    client: Client,
    download_timeout: Duration,
}

impl HttpDocumentExtractor {
    pub fn new(client: Client, download_timeout: Duration) -> Self {
        Self {
            client,
            download_timeout,
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
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

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl DocumentExtractor for HttpDocumentExtractor {
    async fn extract(&self, url: &str, kind: FileKind) -> Result<String, ExtractError> {
        let bytes = self.download(url).await?;
        tracing::debug!("Downloaded {} bytes of {} from {}", bytes.len(), kind, url);

        tokio::task::spawn_blocking(move || extract_bytes(kind, &bytes))
            .await
            .map_err(|e| ExtractError::Parse {
                kind,
                message: format!("extractor task failed: {}", e),
            })?
    }
}
