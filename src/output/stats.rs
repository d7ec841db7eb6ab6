//! Statistics display for finished crawls

use crate::crawler::CrawlReport;

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report whose statistics to display
pub fn print_statistics(report: &CrawlReport) {
    let stats = &report.stats;

    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Start URL: {}", report.start_url);
    println!("  Duration: {}s", report.duration_seconds());
    if report.cancelled {
        println!("  Status: cancelled (partial results)");
    }
    println!("  Pages visited: {}", stats.pages_visited);
    println!("  Results kept: {}", report.results.len());
    println!();

    println!("Results:");
    println!("  HTML pages: {}", stats.html_pages);
    println!("  Documents: {}", stats.file_pages);
    println!("  Errors: {}", stats.errors);
    println!();

    println!("Skipped:");
    println!("  Duplicate content: {}", stats.duplicates);
    println!("  Low quality: {}", stats.low_quality);
    println!("  Recursive paths: {}", stats.skipped_recursive);
    println!("  Off-domain: {}", stats.skipped_off_domain);
    println!("  Already visited: {}", stats.skipped_revisit);
    println!();

    println!("Links:");
    println!("  Discovered: {}", stats.links_discovered);
    println!("  Enqueued: {}", stats.links_enqueued);
    println!("  Probed: {}", stats.probes);
    println!("  Aliases collapsed: {}", stats.aliases_collapsed);
    if stats.queue_truncations > 0 {
        println!("  Queue truncations: {}", stats.queue_truncations);
    }
    println!();

    let ok = report.results.iter().filter(|r| !r.is_error()).count();
    println!(
        "Success Rate: {:.1}% ({} / {} results without errors)",
        success_rate(report),
        ok,
        report.results.len()
    );
}

/// Share of results that are not errors, as a percentage
pub fn success_rate(report: &CrawlReport) -> f64 {
    if report.results.is_empty() {
        return 0.0;
    }
    let ok = report.results.iter().filter(|r| !r.is_error()).count();
    (ok as f64 / report.results.len() as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::sample_report;

    #[test]
    fn test_success_rate() {
        let rate = success_rate(&sample_report());
        assert!((rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_success_rate_empty() {
        let mut report = sample_report();
        report.results.clear();
        assert_eq!(success_rate(&report), 0.0);
    }
}
