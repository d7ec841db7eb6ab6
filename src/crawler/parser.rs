//! HTML post-processing for rendered pages
//!
//! This module handles parsing rendered HTML to extract:
//! - Visible body text (the corpus entry)
//! - Outbound links, including synthetic `#id` fragment links
//! - Site metadata (title, description, favicon)
//! - JSON-LD structured data
//! - The content signature used for duplicate detection

use crate::crawler::report::SiteMeta;
use crate::url::{canonicalize, origin_of};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use url::Url;

static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*//.*?$").unwrap());
static TRAILING_COMMA: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([}\]])").unwrap());

/// Returns the visible text of the `<body>`, one trimmed line per text run
///
/// `<script>` and `<style>` contents are dropped, as are blank lines.
///
/// # Example
///
/// ```
/// use site_corpus::crawler::clean_text;
///
/// let html = "<html><body><h1> Title </h1><script>x()</script><p>Body\n\n text</p></body></html>";
/// assert_eq!(clean_text(html), "Title\nBody\ntext");
/// ```
pub fn clean_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let root = Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next())
        .unwrap_or_else(|| document.root_element());

    let mut raw = String::new();
    collect_text(root, &mut raw);

    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push('\n');
            }
            Node::Element(el) if matches!(el.name(), "script" | "style") => {}
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, out);
                }
            }
            _ => {}
        }
    }
}

/// Extracts outbound links from a page
///
/// Two sources are merged, in document order and without duplicates:
/// - `<a href>` values resolved against `page_url` and canonicalized
/// - anchors with an inert `href="#"` and an `id`, which become `page_url#id`
///
/// `mailto:`, `javascript:`, `tel:` and `data:` links and anything that is
/// not HTTP(S) after resolution are dropped.
pub fn extract_links(html: &str, page_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut hrefs = Vec::new();
    let mut synthetic = Vec::new();
    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href").map(str::trim) else {
            continue;
        };

        if href == "#" {
            if let Some(id) = element.value().id().map(str::trim).filter(|id| !id.is_empty()) {
                if let Ok(link) = canonicalize(&format!("#{}", id), Some(page_url)) {
                    synthetic.push(link);
                }
            }
            continue;
        }

        if let Some(link) = resolve_link(href, page_url) {
            hrefs.push(link);
        }
    }

    let mut seen = HashSet::new();
    hrefs
        .into_iter()
        .chain(synthetic)
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

/// Resolves a link href to a canonical absolute URL
///
/// Returns None if the link should be excluded:
/// - empty hrefs
/// - javascript:, mailto:, tel: schemes and data: URIs
/// - invalid or non-HTTP(S) URLs
fn resolve_link(href: &str, page_url: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return None;
    }

    canonicalize(href, Some(page_url)).ok()
}

/// Extracts title, description and favicon for the site
///
/// Each field falls back in turn: renderer metadata, then `<title>` and
/// `<meta name="description">`, then Open Graph and Twitter-card tags. The
/// favicon comes from the first `icon`/`apple-touch-icon`/`mask-icon` link,
/// else `/favicon.ico` on the page's origin.
pub fn extract_site_meta(
    html: &str,
    metadata: &HashMap<String, String>,
    page_url: &str,
) -> SiteMeta {
    let document = Html::parse_document(html);

    let meta_value = |key: &str| {
        metadata
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let title = meta_value("title")
        .or_else(|| first_text(&document, "title"))
        .or_else(|| first_content(&document, r#"meta[property="og:title" i]"#))
        .or_else(|| first_content(&document, r#"meta[name="twitter:title" i]"#))
        .unwrap_or_default();

    let description = meta_value("description")
        .or_else(|| meta_value("og:description"))
        .or_else(|| first_content(&document, r#"meta[name="description" i]"#))
        .or_else(|| first_content(&document, r#"meta[property="og:description" i]"#))
        .or_else(|| first_content(&document, r#"meta[name="twitter:description" i]"#))
        .unwrap_or_default();

    let favicon_url = find_favicon(&document, page_url).unwrap_or_else(|| default_favicon(page_url));

    SiteMeta {
        title,
        description,
        favicon_url,
    }
}

/// Site metadata used when no HTML page rendered successfully
pub fn fallback_site_meta(start_url: &str) -> SiteMeta {
    SiteMeta {
        title: String::new(),
        description: String::new(),
        favicon_url: default_favicon(start_url),
    }
}

fn default_favicon(page_url: &str) -> String {
    match origin_of(page_url) {
        Some(origin) => format!("{}/favicon.ico", origin),
        None => String::new(),
    }
}

fn find_favicon(document: &Html, page_url: &str) -> Option<String> {
    let selector = Selector::parse(
        r#"link[rel*="icon" i], link[rel*="apple-touch-icon" i], link[rel="mask-icon" i]"#,
    )
    .ok()?;
    let base = Url::parse(page_url).ok()?;

    document
        .select(&selector)
        .filter_map(|link| link.value().attr("href"))
        .map(str::trim)
        .find(|href| !href.is_empty())
        .and_then(|href| base.join(href).ok())
        .map(|url| url.to_string())
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn first_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parses JSON-LD blocks
///
/// Comments and trailing commas are tolerated; arrays are flattened and
/// unparseable blocks are skipped.
pub fn extract_json_ld(html: &str) -> Vec<serde_json::Value> {
    let document = Html::parse_document(html);
    let Ok(scripts) = Selector::parse("script[type]") else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for script in document.select(&scripts) {
        if !is_json_ld(&script) {
            continue;
        }

        let raw = script.text().collect::<String>();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let cleaned = BLOCK_COMMENT.replace_all(raw, "");
        let cleaned = LINE_COMMENT.replace_all(&cleaned, "");
        let cleaned = TRAILING_COMMA.replace_all(&cleaned, "$1");

        match serde_json::from_str::<serde_json::Value>(&cleaned) {
            Ok(serde_json::Value::Array(items)) => out.extend(items),
            Ok(value) => out.push(value),
            Err(e) => tracing::trace!("Skipping unparseable JSON-LD block: {}", e),
        }
    }
    out
}

fn is_json_ld(script: &ElementRef<'_>) -> bool {
    script
        .value()
        .attr("type")
        .map(|t| t.to_ascii_lowercase().contains("ld+json"))
        .unwrap_or(false)
}

/// Fingerprint of a page's content
///
/// SHA-256 (hex) of the markdown, or of `text` when there is no markdown,
/// with all whitespace runs collapsed to single spaces.
pub fn content_signature(markdown: Option<&str>, text: &str) -> String {
    let basis = markdown.filter(|md| !md.is_empty()).unwrap_or(text);
    let normalized = basis.split_whitespace().collect::<Vec<_>>().join(" ");
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://example.com/page";

    #[test]
    fn test_clean_text_body_only() {
        let html = r#"<html><head><title>Head title</title><style>p{}</style></head>
            <body>
                <h1>  Heading  </h1>
                <script>alert('x');</script>
                <p>First line</p>

                <p>Second <b>bold</b></p>
            </body></html>"#;

        assert_eq!(clean_text(html), "Heading\nFirst line\nSecond\nbold");
    }

    #[test]
    fn test_clean_text_empty_body() {
        assert_eq!(clean_text("<html><body>   </body></html>"), "");
    }

    #[test]
    fn test_extract_relative_and_absolute_links() {
        let html = r#"<body>
            <a href="/other">Other</a>
            <a href="sub">Sub</a>
            <a href="https://OTHER.com/x">Ext</a>
        </body>"#;

        let links = extract_links(html, PAGE);
        assert_eq!(
            links,
            vec![
                "https://example.com/other",
                "https://example.com/sub",
                "https://other.com/x",
            ]
        );
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"<body>
            <a href="mailto:a@example.com">m</a>
            <a href="JavaScript:void(0)">j</a>
            <a href="tel:+1">t</a>
            <a href="data:text/html,hi">d</a>
            <a href="ftp://example.com/f">f</a>
            <a href="">e</a>
            <a href="/ok">ok</a>
        </body>"#;

        assert_eq!(extract_links(html, PAGE), vec!["https://example.com/ok"]);
    }

    #[test]
    fn test_fragment_links_preserved() {
        let html = r##"<body><a href="#2024">2024</a><a href="/a#2025">2025</a></body>"##;
        let links = extract_links(html, PAGE);
        assert_eq!(
            links,
            vec!["https://example.com/page#2024", "https://example.com/a#2025"]
        );
    }

    #[test]
    fn test_synthetic_fragment_links_from_ids() {
        let html = r##"<body>
            <a href="/real">Real</a>
            <a href="#" id="2023">2023</a>
            <a href="#" id="  ">blank</a>
            <a href="#">no id</a>
        </body>"##;

        let links = extract_links(html, PAGE);
        assert_eq!(
            links,
            vec!["https://example.com/real", "https://example.com/page#2023"]
        );
    }

    #[test]
    fn test_links_deduplicated_in_order() {
        let html = r##"<body>
            <a href="/b">b</a><a href="/a">a</a><a href="/b">b again</a>
            <a href="#x">x</a><a href="#" id="x">x id</a>
        </body>"##;

        let links = extract_links(html, PAGE);
        assert_eq!(
            links,
            vec![
                "https://example.com/b",
                "https://example.com/a",
                "https://example.com/page#x",
            ]
        );
    }

    #[test]
    fn test_site_meta_prefers_renderer_metadata() {
        let mut metadata = HashMap::new();
        metadata.insert("title".to_string(), " Rendered ".to_string());
        metadata.insert("og:description".to_string(), "From OG".to_string());

        let html = "<html><head><title>Tag title</title></head><body></body></html>";
        let meta = extract_site_meta(html, &metadata, PAGE);
        assert_eq!(meta.title, "Rendered");
        assert_eq!(meta.description, "From OG");
    }

    #[test]
    fn test_site_meta_from_tags() {
        let html = r#"<html><head>
            <title> Tag title </title>
            <meta name="Description" content="Plain description">
            <link rel="shortcut icon" href="/static/fav.png">
        </head><body></body></html>"#;

        let meta = extract_site_meta(html, &HashMap::new(), PAGE);
        assert_eq!(meta.title, "Tag title");
        assert_eq!(meta.description, "Plain description");
        assert_eq!(meta.favicon_url, "https://example.com/static/fav.png");
    }

    #[test]
    fn test_site_meta_social_fallbacks() {
        let html = r#"<html><head>
            <meta property="og:title" content="OG title">
            <meta name="twitter:description" content="Card description">
            <link rel="apple-touch-icon" href="https://cdn.example.com/touch.png">
        </head><body></body></html>"#;

        let meta = extract_site_meta(html, &HashMap::new(), PAGE);
        assert_eq!(meta.title, "OG title");
        assert_eq!(meta.description, "Card description");
        assert_eq!(meta.favicon_url, "https://cdn.example.com/touch.png");
    }

    #[test]
    fn test_site_meta_default_favicon() {
        let meta = extract_site_meta("<html></html>", &HashMap::new(), "https://example.com:8443/a/b");
        assert_eq!(meta.title, "");
        assert_eq!(meta.favicon_url, "https://example.com:8443/favicon.ico");
    }

    #[test]
    fn test_fallback_site_meta() {
        let meta = fallback_site_meta("https://example.com/start");
        assert_eq!(meta.favicon_url, "https://example.com/favicon.ico");
        assert!(meta.title.is_empty() && meta.description.is_empty());
    }

    #[test]
    fn test_json_ld_lenient_parsing() {
        let html = r#"<html><head>
            <script type="application/ld+json">
            /* block comment */
            {
                // line comment
                "@type": "Organization",
                "name": "Example",
            }
            </script>
            <script type="application/LD+JSON">[{"@type": "A"}, {"@type": "B"}]</script>
            <script type="application/ld+json">{ not json </script>
            <script type="text/javascript">var x = {};</script>
        </head></html>"#;

        let data = extract_json_ld(html);
        assert_eq!(data.len(), 3);
        assert_eq!(data[0]["name"], "Example");
        assert_eq!(data[1]["@type"], "A");
        assert_eq!(data[2]["@type"], "B");
    }

    #[test]
    fn test_signature_ignores_whitespace_layout() {
        let a = content_signature(None, "Hello   world\n\nagain");
        let b = content_signature(None, "  Hello world again ");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_signature_prefers_markdown() {
        let with_md = content_signature(Some("# Title"), "different text");
        let md_only = content_signature(None, "# Title");
        assert_eq!(with_md, md_only);

        let empty_md = content_signature(Some(""), "text");
        assert_eq!(empty_md, content_signature(None, "text"));
    }
}
