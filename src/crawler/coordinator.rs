//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the frontier to the
//! collaborators:
//! - Popping targets breadth-first and filtering them (revisit, recursive
//!   path, off-domain)
//! - Dispatching each target to the renderer or a document extractor
//! - Applying signatures, low-quality filtering, depth and page budgets
//! - Probing and enqueueing discovered links
//! - Aggregating the final report
//!
//! Targets are processed in waves of up to `concurrency` fetches. Fetches in
//! a wave run concurrently; their outcomes are applied one at a time in pop
//! order, so with `concurrency = 1` the traversal is strictly sequential and
//! with more it yields the same ordering.

use crate::config::{validate, Config};
use crate::crawler::dispatch::{classify, Target};
use crate::crawler::fetcher::{build_http_client, HttpRenderer, RenderOptions, RenderedPage, Renderer};
use crate::crawler::frontier::{CrawlTarget, Frontier};
use crate::crawler::parser::{
    clean_text, content_signature, extract_json_ld, extract_links, extract_site_meta,
    fallback_site_meta,
};
use crate::crawler::report::{combine_text, CrawlReport, CrawlStats, PageKind, PageResult, SiteMeta};
use crate::crawler::resolver::{resolve_final, HttpProber, Prober};
use crate::extract::{DocumentExtractor, FileKind, HttpDocumentExtractor};
use crate::state::VisitState;
use crate::url::{
    canonicalize, extract_host, is_low_quality, is_recursive_path, same_domain, strip_fragment,
};
use crate::{CorpusError, ExtractError, FetchError, UrlError};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Outcome of fetching one target, before it is applied to the frontier
enum Fetched {
    File {
        kind: FileKind,
        result: Result<String, ExtractError>,
    },
    Page(Result<RenderedPage, FetchError>),
}

/// Mutable state of a single crawl
struct CrawlRun {
    start_url: String,
    base_host: String,
    frontier: Frontier,
    results: Vec<PageResult>,
    stats: CrawlStats,
    site_meta: Option<SiteMeta>,
    started_at: DateTime<Utc>,
    clock: Instant,
}

impl CrawlRun {
    fn new(start_url: String, base_host: String) -> Self {
        Self {
            frontier: Frontier::new(CrawlTarget::new(start_url.clone(), 0)),
            start_url,
            base_host,
            results: Vec::new(),
            stats: CrawlStats::default(),
            site_meta: None,
            started_at: Utc::now(),
            clock: Instant::now(),
        }
    }

    fn record_error(&mut self, target: &CrawlTarget, message: String) {
        tracing::warn!("Fetch failed: {} -> {}", target.url, message);
        self.results
            .push(PageResult::error(target.url.clone(), target.depth, message));
        self.stats.errors += 1;
        self.frontier.set_state(&target.url, VisitState::Error);
    }

    fn into_report(self, cancelled: bool) -> CrawlReport {
        let site_meta = self
            .site_meta
            .unwrap_or_else(|| fallback_site_meta(&self.start_url));

        CrawlReport {
            combined_text: combine_text(&self.results),
            urls_seen: self.frontier.urls_seen(),
            visits: self.frontier.visit_records(),
            start_url: self.start_url,
            results: self.results,
            site_meta,
            stats: self.stats,
            started_at: self.started_at,
            finished_at: Utc::now(),
            cancelled,
        }
    }
}

/// Single-site crawler
///
/// Owns the configuration and the collaborators. Each call to
/// [`Crawler::crawl`] creates fresh frontier state, so one `Crawler` can run
/// several crawls; callers must not crawl the same origin concurrently.
pub struct Crawler {
    config: Config,
    render_options: RenderOptions,
    renderer: Arc<dyn Renderer>,
    prober: Arc<dyn Prober>,
    extractor: Arc<dyn DocumentExtractor>,
}

impl Crawler {
    /// Creates a crawler with explicit collaborators
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - The configuration is valid
    /// * `Err(CorpusError::Config)` - The configuration failed validation
    pub fn new(
        config: Config,
        renderer: Arc<dyn Renderer>,
        prober: Arc<dyn Prober>,
        extractor: Arc<dyn DocumentExtractor>,
    ) -> Result<Self, CorpusError> {
        validate(&config)?;
        let render_options = RenderOptions::from_config(&config.render);

        Ok(Self {
            config,
            render_options,
            renderer,
            prober,
            extractor,
        })
    }

    /// Creates a crawler backed by the HTTP renderer, prober and extractor
    ///
    /// All three share one HTTP client.
    pub fn from_config(config: Config) -> Result<Self, CorpusError> {
        let client = build_http_client(&config.user_agent)?;

        let renderer = Arc::new(HttpRenderer::new(
            client.clone(),
            config.user_agent.crawler_name.clone(),
        ));
        let prober = Arc::new(HttpProber::new(client.clone()));
        let extractor = Arc::new(HttpDocumentExtractor::new(
            client,
            Duration::from_millis(config.timeouts.download_ms),
        ));

        Self::new(config, renderer, prober, extractor)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Crawls the site at `start_url`
    ///
    /// Only an invalid start URL fails the crawl; every page-level failure
    /// becomes an error result. When `cancel` fires, no new work is started,
    /// in-flight fetches finish, and the partial report is returned with
    /// `cancelled = true`.
    pub async fn crawl(
        &self,
        start_url: &str,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, CorpusError> {
        let start = canonicalize(start_url, None)?;
        let base_host = extract_host(&start).ok_or(UrlError::MissingHost)?;
        let settings = &self.config.crawler;

        tracing::info!(
            "Starting crawl of {} (max depth {}, max pages {}, concurrency {})",
            start,
            settings.max_depth,
            settings.max_pages,
            settings.concurrency
        );

        let mut run = CrawlRun::new(start, base_host);
        let mut cancelled = false;

        loop {
            if cancel.is_cancelled() {
                tracing::warn!(
                    "Crawl cancelled with {} results and {} queued",
                    run.results.len(),
                    run.frontier.len()
                );
                cancelled = true;
                break;
            }

            let remaining = settings.max_pages.saturating_sub(run.results.len());
            if remaining == 0 {
                tracing::info!("Page budget of {} reached", settings.max_pages);
                break;
            }

            let wave = self.next_wave(&mut run, remaining.min(settings.concurrency));
            if wave.is_empty() {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            }

            let fetched = futures::future::join_all(wave.iter().map(|t| self.fetch(t))).await;
            for (target, outcome) in wave.into_iter().zip(fetched) {
                self.apply(&mut run, target, outcome, &cancel).await;
            }
        }

        let report = run.into_report(cancelled);
        tracing::info!(
            "Crawl finished: {} results from {} visited pages in {}s",
            report.results.len(),
            report.stats.pages_visited,
            report.duration_seconds()
        );
        Ok(report)
    }

    /// Pops up to `limit` fetchable targets, marking each visited
    fn next_wave(&self, run: &mut CrawlRun, limit: usize) -> Vec<CrawlTarget> {
        let settings = &self.config.crawler;
        let mut wave = Vec::with_capacity(limit);

        while wave.len() < limit {
            let Some(target) = run.frontier.pop() else {
                break;
            };

            if run.frontier.is_visited(&target.url) {
                run.stats.skipped_revisit += 1;
                continue;
            }

            if is_recursive_path(&target.url, settings.recursion_threshold) {
                tracing::debug!("Skipping recursive path: {}", target.url);
                run.stats.skipped_recursive += 1;
                run.frontier.set_state(&target.url, VisitState::Skipped);
                continue;
            }

            if settings.same_domain_only && !same_domain(&target.url, &run.base_host) {
                tracing::debug!("Skipping off-domain: {}", target.url);
                run.stats.skipped_off_domain += 1;
                run.frontier.set_state(&target.url, VisitState::Skipped);
                continue;
            }

            if run.frontier.mark_visited(&target) {
                tracing::info!("Visiting (depth {}): {}", target.depth, target.url);
                wave.push(target);
            }
        }

        wave
    }

    /// Fetches one target through the matching collaborator, bounded by its timeout
    async fn fetch(&self, target: &CrawlTarget) -> Fetched {
        let timeouts = &self.config.timeouts;

        match classify(&target.url) {
            Target::File(kind) => {
                let limit = Duration::from_millis(timeouts.download_ms);
                let result =
                    match tokio::time::timeout(limit, self.extractor.extract(&target.url, kind)).await {
                        Ok(result) => result,
                        Err(_) => Err(ExtractError::Timeout {
                            url: target.url.clone(),
                        }),
                    };
                Fetched::File { kind, result }
            }
            Target::Html => {
                let limit = Duration::from_millis(timeouts.render_ms);
                let render = self.renderer.render(&target.url, &self.render_options);
                let result = match tokio::time::timeout(limit, render).await {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout {
                        url: target.url.clone(),
                    }),
                };
                Fetched::Page(result)
            }
        }
    }

    /// Applies a fetch outcome to the run: results, signatures, children
    async fn apply(
        &self,
        run: &mut CrawlRun,
        target: CrawlTarget,
        fetched: Fetched,
        cancel: &CancellationToken,
    ) {
        run.stats.pages_visited += 1;

        let links = match fetched {
            Fetched::File {
                kind,
                result: Ok(text),
            } => {
                tracing::info!("Captured file ({}): {}", kind, target.url);
                run.results.push(PageResult::file(
                    target.url.clone(),
                    target.depth,
                    kind,
                    text,
                ));
                run.stats.file_pages += 1;
                run.frontier.set_state(&target.url, VisitState::Accepted);
                None
            }
            Fetched::File { result: Err(e), .. } => {
                run.record_error(&target, e.to_string());
                None
            }
            Fetched::Page(Err(e)) => {
                run.record_error(&target, e.to_string());
                None
            }
            Fetched::Page(Ok(page)) if !page.success => {
                run.record_error(&target, "renderer returned unsuccessful status".to_string());
                None
            }
            Fetched::Page(Ok(page)) => self.process_page(run, &target, page),
        };

        if let Some(links) = links {
            if cancel.is_cancelled() {
                tracing::debug!("Cancelled; not following links of {}", target.url);
            } else {
                self.enqueue_links(run, links, target.depth + 1, cancel)
                    .await;
            }
        }

        let max_pages = self.config.crawler.max_pages;
        if run.results.len() + run.frontier.len() > max_pages.saturating_mul(2) {
            let dropped = run.frontier.truncate(max_pages);
            if dropped > 0 {
                tracing::warn!("Queue bound exceeded, dropped {} pending targets", dropped);
                run.stats.queue_truncations += 1;
            }
        }

        if run.stats.pages_visited % 10 == 0 {
            let elapsed = run.clock.elapsed().as_secs_f64();
            tracing::info!(
                "Progress: {} pages visited, {} results, {} in queue, {:.2} pages/sec",
                run.stats.pages_visited,
                run.results.len(),
                run.frontier.len(),
                run.stats.pages_visited as f64 / elapsed.max(f64::EPSILON)
            );
        }
    }

    /// Post-processes a rendered page; returns the links to follow, if any
    fn process_page(
        &self,
        run: &mut CrawlRun,
        target: &CrawlTarget,
        page: RenderedPage,
    ) -> Option<Vec<String>> {
        let settings = &self.config.crawler;

        let structured_data = extract_json_ld(&page.html);
        if run.site_meta.is_none() && !page.html.is_empty() {
            run.site_meta = Some(extract_site_meta(&page.html, &page.metadata, &target.url));
        }

        let text = clean_text(&page.html);
        let final_url =
            canonicalize(&page.response_url, None).unwrap_or_else(|_| target.url.clone());
        run.frontier.record_landing(final_url.clone());

        let signature = content_signature(page.markdown.as_deref(), &text);
        let state = if !run.frontier.insert_signature(signature) {
            tracing::info!("Duplicate page content: {}", final_url);
            run.stats.duplicates += 1;
            VisitState::Duplicate
        } else if is_low_quality(&target.url, &settings.low_quality_patterns) {
            tracing::info!("Low-quality pattern hit: {}", target.url);
            run.stats.low_quality += 1;
            VisitState::Filtered
        } else {
            VisitState::Accepted
        };
        run.frontier.set_state(&target.url, state);

        let links = (state.follows_links() && target.depth < settings.max_depth)
            .then(|| extract_links(&page.html, &target.url));

        if state.produces_result() {
            tracing::info!(
                "Saved page (words={}): {}",
                text.split_whitespace().count(),
                target.url
            );
            run.results.push(PageResult {
                url: final_url,
                depth: target.depth,
                kind: PageKind::Html,
                text: Some(text),
                html: Some(page.html),
                markdown: page.markdown,
                structured_data,
                error: None,
            });
            run.stats.html_pages += 1;
        }

        if let Some(links) = &links {
            run.stats.links_discovered += links.len() as u64;
        }
        links
    }

    /// Filters, probes and enqueues links discovered on one page
    async fn enqueue_links(
        &self,
        run: &mut CrawlRun,
        links: Vec<String>,
        depth: u32,
        cancel: &CancellationToken,
    ) {
        let settings = &self.config.crawler;

        let candidates: Vec<String> = links
            .into_iter()
            .filter(|link| !run.frontier.is_known(link) && !run.frontier.is_landed(link))
            .filter(|link| !settings.same_domain_only || same_domain(link, &run.base_host))
            .filter(|link| !is_recursive_path(link, settings.recursion_threshold))
            .collect();
        if candidates.is_empty() {
            return;
        }

        let probe_timeout = Duration::from_millis(self.config.timeouts.probe_ms);
        let resolved: Vec<Option<String>> = stream::iter(candidates.iter())
            .map(|link| self.probe(link, probe_timeout))
            .buffered(settings.concurrency)
            .collect()
            .await;
        run.stats.probes += candidates
            .iter()
            .filter(|link| self.should_probe(link))
            .count() as u64;

        if cancel.is_cancelled() {
            tracing::debug!("Cancelled; dropping {} candidate links", candidates.len());
            return;
        }

        for (link, resolved) in candidates.into_iter().zip(resolved) {
            if let Some(resolved) = resolved {
                if run.frontier.is_known(&resolved) || run.frontier.is_landed(&resolved) {
                    tracing::debug!("Collapsed alias {} -> {}", link, resolved);
                    run.stats.aliases_collapsed += 1;
                    continue;
                }
            }

            if run.frontier.enqueue(CrawlTarget::new(link, depth)) {
                run.stats.links_enqueued += 1;
            }
        }
    }

    /// Fragment variants are never probed: a probe cannot tell fragments apart
    fn should_probe(&self, link: &str) -> bool {
        self.config.crawler.probe_redirects && strip_fragment(link) == link
    }

    async fn probe(&self, link: &str, timeout: Duration) -> Option<String> {
        if !self.should_probe(link) {
            return None;
        }
        let resolved = resolve_final(self.prober.as_ref(), link, timeout).await;
        tracing::trace!("Probe {} -> {:?}", link, resolved);
        resolved
    }
}
