//! Redirect resolution for candidate links
//!
//! A best-effort probe maps a link to where it finally lands so that alias
//! URLs (tracking redirects, trailing-slash variants) are collapsed before
//! they take a frontier slot. HTTP-level rejections and redirects are plain
//! return values; only network failures yield `None`.

use crate::url::canonicalize;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Outcome of a single probe request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status of the last response in the redirect chain
    pub status: u16,
    /// URL of the last response in the redirect chain
    pub final_url: String,
}

impl ProbeResponse {
    /// True when the HEAD answer cannot be trusted and a GET should be tried
    pub fn needs_get_fallback(&self) -> bool {
        matches!(self.status, 403 | 405) || (300..400).contains(&self.status)
    }
}

/// HTTP probe client (redirects followed)
#[async_trait]
pub trait Prober: Send + Sync {
    async fn head(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, FetchError>;

    /// GET without reading the body
    async fn get(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, FetchError>;
}

/// reqwest-backed prober
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn head(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, FetchError> {
        let response = self
            .client
            .head(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        Ok(ProbeResponse {
            status: response.status().as_u16(),
            final_url: response.url().to_string(),
        })
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<ProbeResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        // Dropping the response closes the stream without reading the body
        Ok(ProbeResponse {
            status: response.status().as_u16(),
            final_url: response.url().to_string(),
        })
    }
}

/// Resolves the final destination of `url`
///
/// Sends a HEAD request and falls back to a GET when HEAD is rejected
/// (403/405) or itself ends on a redirect. Each request is bounded by
/// `timeout`.
///
/// # Returns
///
/// * `Some(String)` - The canonicalized final URL
/// * `None` - Any network failure or timeout; the caller keeps the link as-is
pub async fn resolve_final(prober: &dyn Prober, url: &str, timeout: Duration) -> Option<String> {
    let head = match tokio::time::timeout(timeout, prober.head(url, timeout)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::trace!("HEAD probe failed for {}: {}", url, e);
            return None;
        }
        Err(_) => {
            tracing::trace!("HEAD probe timed out for {}", url);
            return None;
        }
    };

    let response = if head.needs_get_fallback() {
        tracing::trace!("HEAD returned {} for {}, retrying with GET", head.status, url);
        match tokio::time::timeout(timeout, prober.get(url, timeout)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::trace!("GET probe failed for {}: {}", url, e);
                return None;
            }
            Err(_) => {
                tracing::trace!("GET probe timed out for {}", url);
                return None;
            }
        }
    } else {
        head
    };

    canonicalize(&response.final_url, None).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Prober answering from fixed tables; unknown URLs fail like a network error
    #[derive(Default)]
    struct TableProber {
        head: HashMap<String, ProbeResponse>,
        get: HashMap<String, ProbeResponse>,
        get_calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl TableProber {
        fn lookup(
            table: &HashMap<String, ProbeResponse>,
            url: &str,
        ) -> Result<ProbeResponse, FetchError> {
            table.get(url).cloned().ok_or_else(|| FetchError::Render {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    #[async_trait]
    impl Prober for TableProber {
        async fn head(&self, url: &str, _timeout: Duration) -> Result<ProbeResponse, FetchError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Self::lookup(&self.head, url)
        }

        async fn get(&self, url: &str, _timeout: Duration) -> Result<ProbeResponse, FetchError> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            Self::lookup(&self.get, url)
        }
    }

    fn response(status: u16, final_url: &str) -> ProbeResponse {
        ProbeResponse {
            status,
            final_url: final_url.to_string(),
        }
    }

    const TIMEOUT: Duration = Duration::from_millis(200);

    #[tokio::test]
    async fn test_head_success_returns_final_url() {
        let mut prober = TableProber::default();
        prober.head.insert(
            "https://site.com/go".to_string(),
            response(200, "HTTPS://Site.com/landing"),
        );

        let resolved = resolve_final(&prober, "https://site.com/go", TIMEOUT).await;
        assert_eq!(resolved.as_deref(), Some("https://site.com/landing"));
        assert_eq!(prober.get_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_head_rejected_falls_back_to_get() {
        let mut prober = TableProber::default();
        let url = "https://site.com/go".to_string();
        prober.head.insert(url.clone(), response(405, &url));
        prober
            .get
            .insert(url.clone(), response(200, "https://site.com/real"));

        let resolved = resolve_final(&prober, &url, TIMEOUT).await;
        assert_eq!(resolved.as_deref(), Some("https://site.com/real"));
        assert_eq!(prober.get_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_head_redirect_falls_back_to_get() {
        let mut prober = TableProber::default();
        let url = "https://site.com/loop".to_string();
        prober.head.insert(url.clone(), response(302, &url));
        prober
            .get
            .insert(url.clone(), response(200, "https://site.com/done"));

        let resolved = resolve_final(&prober, &url, TIMEOUT).await;
        assert_eq!(resolved.as_deref(), Some("https://site.com/done"));
    }

    #[tokio::test]
    async fn test_network_failure_is_none() {
        let prober = TableProber::default();
        assert_eq!(resolve_final(&prober, "https://site.com/x", TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn test_get_failure_after_fallback_is_none() {
        let mut prober = TableProber::default();
        let url = "https://site.com/x".to_string();
        prober.head.insert(url.clone(), response(403, &url));

        assert_eq!(resolve_final(&prober, &url, TIMEOUT).await, None);
    }

    #[tokio::test]
    async fn test_slow_probe_times_out() {
        let mut prober = TableProber {
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        };
        prober
            .head
            .insert("https://site.com/slow".to_string(), response(200, "https://site.com/slow"));

        let resolved = resolve_final(&prober, "https://site.com/slow", Duration::from_millis(20)).await;
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_needs_get_fallback() {
        assert!(response(403, "x").needs_get_fallback());
        assert!(response(405, "x").needs_get_fallback());
        assert!(response(301, "x").needs_get_fallback());
        assert!(!response(200, "x").needs_get_fallback());
        assert!(!response(404, "x").needs_get_fallback());
    }
}
