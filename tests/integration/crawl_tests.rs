//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through the HTTP renderer, prober and
//! document extractor.

use site_corpus::config::{Config, OutputConfig};
use site_corpus::output::write_outputs;
use site_corpus::{crawl, Crawler, PageKind, VisitState};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> Config {
    let mut config = Config::default();
    config.user_agent.crawler_name = "TestBot".to_string();
    config.timeouts.render_ms = 5_000;
    config.timeouts.probe_ms = 2_000;
    config.timeouts.download_ms = 5_000;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        ResponseTemplate::new(200).set_body_raw(
            r#"<html><head>
                <title>Home</title>
                <meta name="description" content="The home page">
                <link rel="icon" href="/static/icon.png">
            </head><body>
                <nav>Menu</nav>
                <p>Welcome home</p>
                <a href="/page1">Page 1</a>
                <a href="/page2">Page 2</a>
                <a href="mailto:someone@example.com">Mail</a>
            </body></html>"#,
            "text/html",
        ),
    )
    .await;
    mount_page(
        &server,
        "/page1",
        html(r#"<p>First page</p><a href="/">Home</a><a href="/page2">Page 2</a>"#),
    )
    .await;
    mount_page(&server, "/page2", html("<p>Second page</p>")).await;

    let report = crawl(test_config(), &format!("{}/", base)).await.unwrap();

    let urls: Vec<_> = report.results.iter().map(|r| r.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/", base),
            format!("{}/page1", base),
            format!("{}/page2", base)
        ]
    );
    assert_eq!(report.urls_seen, urls);
    assert!(report.results.iter().all(|r| r.kind == PageKind::Html));

    let home = &report.results[0];
    assert!(home.text.as_deref().unwrap().contains("Welcome home"));
    let markdown = home.markdown.as_deref().unwrap();
    assert!(markdown.contains("Welcome home"));
    assert!(!markdown.contains("Menu"));

    assert_eq!(report.site_meta.title, "Home");
    assert_eq!(report.site_meta.description, "The home page");
    assert_eq!(report.site_meta.favicon_url, format!("{}/static/icon.png", base));

    assert!(report.combined_text.contains("First page"));
    assert!(report.combined_text.contains("Second page"));
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_robots_disallow_becomes_error_result() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/robots.txt",
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
    )
    .await;
    mount_page(
        &server,
        "/",
        html(r#"<p>Public</p><a href="/private/data">Secret</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/private/data"))
        .respond_with(html("<p>Secret</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(test_config(), &format!("{}/", base)).await.unwrap();

    assert_eq!(report.results.len(), 2);
    let denied = &report.results[1];
    assert_eq!(denied.kind, PageKind::Error);
    assert!(denied.error.as_deref().unwrap().contains("robots.txt"));
}

#[tokio::test]
async fn test_redirect_alias_is_not_crawled_twice() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(r#"<p>Home</p><a href="/page1">Page</a><a href="/old">Old page</a>"#),
    )
    .await;
    mount_page(&server, "/page1", html("<p>Current page</p>")).await;
    Mock::given(method("HEAD"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/page1", base).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(html("<p>Stale copy</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let report = crawl(test_config(), &format!("{}/", base)).await.unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.stats.aliases_collapsed, 1);
    assert!(!report.urls_seen.contains(&format!("{}/old", base)));
}

#[tokio::test]
async fn test_csv_document_extracted() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(r#"<p>Downloads</p><a href="/files/scores.csv">Scores</a>"#),
    )
    .await;
    mount_page(
        &server,
        "/files/scores.csv",
        ResponseTemplate::new(200).set_body_raw("name,score\nalice,1\nbob,2\n", "text/csv"),
    )
    .await;

    let report = crawl(test_config(), &format!("{}/", base)).await.unwrap();

    assert_eq!(report.results.len(), 2);
    let csv = &report.results[1];
    assert_eq!(csv.kind, PageKind::Csv);
    assert_eq!(csv.url, format!("{}/files/scores.csv", base));
    let text = csv.text.as_deref().unwrap();
    assert!(text.contains("| name | score |"));
    assert!(text.contains("| alice | 1 |"));
    assert!(report.combined_text.contains("| bob | 2 |"));
}

#[tokio::test]
async fn test_missing_document_recorded_as_error() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(r#"<p>Reports</p><a href="/annual.pdf">Annual</a>"#),
    )
    .await;

    let report = crawl(test_config(), &format!("{}/", base)).await.unwrap();

    assert_eq!(report.results.len(), 2);
    let pdf = &report.results[1];
    assert_eq!(pdf.kind, PageKind::Error);
    assert_eq!(pdf.text, None);
    assert!(pdf.error.as_deref().unwrap().contains("404"));
}

#[tokio::test]
async fn test_depth_limit_stops_expansion() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html(r#"<p>Root</p><a href="/a">A</a>"#)).await;
    mount_page(&server, "/a", html(r#"<p>Level one</p><a href="/b">B</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("<p>Level two</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.crawler.max_depth = 1;
    let report = crawl(config, &format!("{}/", base)).await.unwrap();

    assert_eq!(report.results.len(), 2);
    assert!(report.results.iter().all(|r| r.depth <= 1));
}

#[tokio::test]
async fn test_duplicate_pages_collapse() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(r#"<p>Index</p><a href="/print">Print</a><a href="/view">View</a>"#),
    )
    .await;
    mount_page(&server, "/print", html("<p>Same article</p>")).await;
    mount_page(&server, "/view", html("<p>Same article</p>")).await;

    let report = crawl(test_config(), &format!("{}/", base)).await.unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.urls_seen.len(), 3);
    assert_eq!(report.visits[2].state, VisitState::Duplicate);
}

#[tokio::test]
async fn test_pages_differing_only_in_link_targets_collapse() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(r#"<p>Choose a language</p><a href="/en">English</a><a href="/fr">French</a>"#),
    )
    .await;
    mount_page(&server, "/en", html(r#"<p>Annual report</p><a href="/">Next</a>"#)).await;
    mount_page(&server, "/fr", html(r#"<p>Annual report</p><a href="/en">Next</a>"#)).await;

    let report = crawl(test_config(), &format!("{}/", base)).await.unwrap();

    let urls: Vec<_> = report.results.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls, vec![format!("{}/", base), format!("{}/en", base)]);
    assert_eq!(report.visits[2].url, format!("{}/fr", base));
    assert_eq!(report.visits[2].state, VisitState::Duplicate);
    assert!(!report.results[1].markdown.as_deref().unwrap().contains("]("));
}

#[tokio::test]
async fn test_concurrent_crawl_matches_sequential_order() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(r#"<p>Root</p><a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>"#),
    )
    .await;
    mount_page(&server, "/a", html(r#"<p>A</p><a href="/d">D</a>"#)).await;
    mount_page(&server, "/b", html("<p>B</p>")).await;
    mount_page(&server, "/c", html("<p>C</p>")).await;
    mount_page(&server, "/d", html("<p>D</p>")).await;

    let start = format!("{}/", base);
    let sequential = crawl(test_config(), &start).await.unwrap();

    let mut config = test_config();
    config.crawler.concurrency = 4;
    let parallel = crawl(config, &start).await.unwrap();

    assert_eq!(sequential.urls_seen, parallel.urls_seen);
    assert_eq!(sequential.combined_text, parallel.combined_text);
    assert_eq!(parallel.results.len(), 5);
}

#[tokio::test]
async fn test_cancelled_crawl_returns_partial_report() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", html("<p>Root</p>")).await;

    let crawler = Crawler::from_config(test_config()).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = crawler.crawl(&format!("{}/", base), cancel).await.unwrap();

    assert!(report.cancelled);
    assert!(report.results.is_empty());
    assert_eq!(report.site_meta.favicon_url, format!("{}/favicon.ico", base));
}

#[tokio::test]
async fn test_invalid_start_url_is_rejected() {
    let result = crawl(test_config(), "ftp://example.com/").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_crawl_then_write_outputs() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", html(r#"<p>Root text</p>"#)).await;

    let report = crawl(test_config(), &format!("{}/", base)).await.unwrap();

    let dir = TempDir::new().unwrap();
    let path = |name: &str| Some(dir.path().join(name).to_string_lossy().into_owned());
    let output = OutputConfig {
        corpus_path: path("combined.txt"),
        report_path: path("report.json"),
        summary_path: path("summary.md"),
        database_path: path("corpus.db"),
    };
    write_outputs(&report, &output, "test-hash").unwrap();

    let corpus = std::fs::read_to_string(dir.path().join("combined.txt")).unwrap();
    assert_eq!(corpus.trim(), "Root text");

    let summary = std::fs::read_to_string(dir.path().join("summary.md")).unwrap();
    assert!(summary.contains(&format!("| 1 | {}/ | 0 | html | 2 |", base)));
}
