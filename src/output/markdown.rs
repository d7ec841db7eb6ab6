//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl,
//! including run information, statistics, site metadata and a per-page
//! table.

use crate::crawler::{CrawlReport, PageResult};
use crate::output::traits::{OutputHandler, OutputResult};
use crate::state::VisitState;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Writes the markdown summary to a file
#[derive(Debug, Clone)]
pub struct MarkdownSummaryWriter {
    path: PathBuf,
}

impl MarkdownSummaryWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OutputHandler for MarkdownSummaryWriter {
    fn name(&self) -> &'static str {
        "markdown summary"
    }

    fn write_report(&self, report: &CrawlReport) -> OutputResult<()> {
        let markdown = format_markdown_summary(report);

        let mut file = File::create(&self.path)?;
        file.write_all(markdown.as_bytes())?;

        Ok(())
    }
}

/// Formats a crawl report as markdown
///
/// # Arguments
///
/// * `report` - The crawl report
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(report: &CrawlReport) -> String {
    let stats = &report.stats;
    let mut md = String::new();

    md.push_str("# Site Corpus Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Start URL**: {}\n", report.start_url));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        report.duration_seconds()
    ));
    let status = if report.cancelled {
        "cancelled"
    } else {
        "completed"
    };
    md.push_str(&format!("- **Status**: {}\n\n", status));

    // Site metadata
    md.push_str("## Site\n\n");
    md.push_str(&format!("- **Title**: {}\n", report.site_meta.title));
    md.push_str(&format!(
        "- **Description**: {}\n",
        report.site_meta.description
    ));
    md.push_str(&format!("- **Favicon**: {}\n\n", report.site_meta.favicon_url));

    // Statistics
    md.push_str("## Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    for (label, value) in [
        ("Results", report.results.len() as u64),
        ("Pages visited", stats.pages_visited),
        ("HTML pages", stats.html_pages),
        ("Documents", stats.file_pages),
        ("Errors", stats.errors),
        ("Duplicates", stats.duplicates),
        ("Low quality", stats.low_quality),
        ("Skipped (recursive)", stats.skipped_recursive),
        ("Skipped (off-domain)", stats.skipped_off_domain),
        ("Links discovered", stats.links_discovered),
        ("Links enqueued", stats.links_enqueued),
        ("Aliases collapsed", stats.aliases_collapsed),
        ("Queue truncations", stats.queue_truncations),
    ] {
        md.push_str(&format!("| {} | {} |\n", label, value));
    }
    md.push('\n');

    // Visit decisions
    if !report.visits.is_empty() {
        md.push_str("## Visits by State\n\n");
        md.push_str("| State | Count |\n");
        md.push_str("|-------|-------|\n");
        for state in VisitState::terminal_states() {
            let count = report.visits.iter().filter(|v| v.state == state).count();
            if count > 0 {
                md.push_str(&format!("| {} | {} |\n", state, count));
            }
        }
        md.push('\n');
    }

    // Pages
    if !report.results.is_empty() {
        md.push_str("## Pages\n\n");
        md.push_str("| # | URL | Depth | Kind | Words / Error |\n");
        md.push_str("|---|-----|-------|------|---------------|\n");

        for (index, result) in report.results.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                index + 1,
                escape_cell(&result.url),
                result.depth,
                result.kind,
                escape_cell(&page_detail(result))
            ));
        }
        md.push('\n');
    }

    md
}

fn page_detail(result: &PageResult) -> String {
    match (&result.error, &result.text) {
        (Some(error), _) => error.clone(),
        (None, Some(text)) => text.split_whitespace().count().to_string(),
        (None, None) => String::new(),
    }
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}
