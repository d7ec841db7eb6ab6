//! Output module for writing crawl reports
//!
//! This module handles:
//! - Writing the combined corpus text
//! - Exporting the full report as JSON
//! - Generating markdown summaries of crawl results
//! - Archiving reports in SQLite
//! - Printing crawl statistics

mod markdown;
mod sqlite_archive;
pub mod stats;
mod text;
mod traits;

pub use markdown::{format_markdown_summary, MarkdownSummaryWriter};
pub use sqlite_archive::{SqliteArchive, SCHEMA_SQL};
pub use stats::{print_statistics, success_rate};
pub use text::{CorpusTextWriter, JsonReportWriter};
pub use traits::{OutputError, OutputHandler, OutputResult};

use crate::config::OutputConfig;
use crate::crawler::CrawlReport;
use std::path::Path;

/// Builds one handler per configured output path
///
/// # Arguments
///
/// * `config` - The output section of the configuration
/// * `config_hash` - Hash recorded with archived runs
///
/// # Returns
///
/// * `Ok(handlers)` - Handlers in the order they should run (possibly empty)
/// * `Err(OutputError)` - The SQLite archive could not be opened
pub fn build_handlers(
    config: &OutputConfig,
    config_hash: &str,
) -> OutputResult<Vec<Box<dyn OutputHandler>>> {
    let mut handlers: Vec<Box<dyn OutputHandler>> = Vec::new();

    if let Some(path) = &config.corpus_path {
        handlers.push(Box::new(CorpusTextWriter::new(path)));
    }
    if let Some(path) = &config.report_path {
        handlers.push(Box::new(JsonReportWriter::new(path)));
    }
    if let Some(path) = &config.summary_path {
        handlers.push(Box::new(MarkdownSummaryWriter::new(path)));
    }
    if let Some(path) = &config.database_path {
        handlers.push(Box::new(SqliteArchive::open(Path::new(path), config_hash)?));
    }

    Ok(handlers)
}

/// Writes a report through every configured output
///
/// Stops at the first failing handler.
pub fn write_outputs(
    report: &CrawlReport,
    config: &OutputConfig,
    config_hash: &str,
) -> OutputResult<()> {
    let handlers = build_handlers(config, config_hash)?;
    if handlers.is_empty() {
        tracing::info!("No output paths configured");
    }

    for handler in handlers {
        tracing::info!("Writing {}", handler.name());
        handler.write_report(report)?;
    }

    Ok(())
}
