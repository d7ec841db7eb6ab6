//! Plain-text and JSON report writers

use crate::crawler::CrawlReport;
use crate::output::traits::{OutputHandler, OutputResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Writes the combined corpus text to a file
#[derive(Debug, Clone)]
pub struct CorpusTextWriter {
    path: PathBuf,
}

impl CorpusTextWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputHandler for CorpusTextWriter {
    fn name(&self) -> &'static str {
        "corpus"
    }

    fn write_report(&self, report: &CrawlReport) -> OutputResult<()> {
        let mut file = File::create(&self.path)?;
        file.write_all(report.combined_text.as_bytes())?;
        if !report.combined_text.is_empty() {
            file.write_all(b"\n")?;
        }
        Ok(())
    }
}

/// Writes the full report as pretty-printed JSON
#[derive(Debug, Clone)]
pub struct JsonReportWriter {
    path: PathBuf,
}

impl JsonReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputHandler for JsonReportWriter {
    fn name(&self) -> &'static str {
        "json report"
    }

    fn write_report(&self, report: &CrawlReport) -> OutputResult<()> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
