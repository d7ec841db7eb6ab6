//! Site-Corpus main entry point
//!
//! This is the command-line interface for the Site-Corpus crawler.

use anyhow::Context;
use clap::Parser;
use site_corpus::config::{load_config_with_hash, validate, Config};
use site_corpus::output::{print_statistics, write_outputs};
use site_corpus::Crawler;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Site-Corpus: crawl one site into a deduplicated text corpus
///
/// Site-Corpus walks every reachable page and embedded document (CSV, XLSX,
/// PDF, DOCX) of a site breadth-first and writes the extracted text, a JSON
/// report, a markdown summary and a SQLite archive.
#[derive(Parser, Debug)]
#[command(name = "site-corpus")]
#[command(version)]
#[command(about = "Crawl one site into a deduplicated text corpus", long_about = None)]
struct Cli {
    /// URL the crawl starts from
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the maximum crawl depth
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Override the maximum number of results
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Follow links to other domains
    #[arg(long)]
    all_domains: bool,

    /// Override the number of concurrent fetches
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            (Config::default(), "defaults".to_string())
        }
    };

    apply_overrides(&cli, &mut config);
    validate(&config).context("invalid configuration after command-line overrides")?;

    if cli.dry_run {
        handle_dry_run(&cli.start_url, &config, &config_hash);
        return Ok(());
    }

    handle_crawl(&cli.start_url, config, &config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_corpus=info,warn"),
            1 => EnvFilter::new("site_corpus=debug,info"),
            2 => EnvFilter::new("site_corpus=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(depth) = cli.max_depth {
        config.crawler.max_depth = depth;
    }
    if let Some(pages) = cli.max_pages {
        config.crawler.max_pages = pages;
    }
    if cli.all_domains {
        config.crawler.same_domain_only = false;
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(start_url: &str, config: &Config, config_hash: &str) {
    println!("=== Site-Corpus Dry Run ===\n");

    println!("Start URL: {}", start_url);
    match site_corpus::canonicalize(start_url, None) {
        Ok(canonical) => println!("  Canonical: {}", canonical),
        Err(e) => println!("  ✗ {}", e),
    }

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Same domain only: {}", config.crawler.same_domain_only);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Recursion threshold: {}", config.crawler.recursion_threshold);
    println!("  Probe redirects: {}", config.crawler.probe_redirects);
    println!(
        "  Low-quality patterns: {}",
        config.crawler.low_quality_patterns.join(", ")
    );

    println!("\nTimeouts:");
    println!("  Render: {}ms", config.timeouts.render_ms);
    println!("  Probe: {}ms", config.timeouts.probe_ms);
    println!("  Download: {}ms", config.timeouts.download_ms);

    println!("\nRender:");
    println!("  Excluded tags: {}", config.render.excluded_tags.join(", "));
    println!("  Excluded selectors: {}", config.render.excluded_selector);
    println!("  Check robots.txt: {}", config.render.check_robots_txt);
    println!("  Bypass cache: {}", config.render.bypass_cache);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    let show = |path: &Option<String>| path.clone().unwrap_or_else(|| "(disabled)".to_string());
    println!("\nOutput:");
    println!("  Corpus: {}", show(&config.output.corpus_path));
    println!("  Report: {}", show(&config.output.report_path));
    println!("  Summary: {}", show(&config.output.summary_path));
    println!("  Database: {}", show(&config.output.database_path));

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
}

/// Handles the main crawl operation
async fn handle_crawl(start_url: &str, config: Config, config_hash: &str) -> anyhow::Result<()> {
    let output = config.output.clone();
    let crawler = Crawler::from_config(config).context("failed to set up crawler")?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            on_signal.cancel();
        }
    });

    let report = crawler
        .crawl(start_url, cancel)
        .await
        .with_context(|| format!("crawl of {} failed", start_url))?;

    write_outputs(&report, &output, config_hash).context("failed to write outputs")?;
    print_statistics(&report);

    Ok(())
}
