//! Output handler trait and error types
//!
//! Output handlers receive the finished `CrawlReport` and hand it to
//! whatever consumes the corpus next: a text file, a JSON document, a
//! markdown summary or a SQLite archive.

use crate::crawler::CrawlReport;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for report writers
///
/// A handler writes one complete report per call. Handlers never see
/// in-progress crawl state.
pub trait OutputHandler {
    /// Short name used in log lines
    fn name(&self) -> &'static str;

    /// Writes the report
    ///
    /// # Arguments
    ///
    /// * `report` - The finished (possibly cancelled) crawl report
    fn write_report(&self, report: &CrawlReport) -> OutputResult<()>;
}
