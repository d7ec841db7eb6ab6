//! Robots.txt caching implementation
//!
//! Each origin's robots.txt is fetched once per crawl and reused; entries
//! older than 24 hours are refetched.

use crate::robots::ParsedRobots;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Cached robots.txt data for an origin
#[derive(Debug, Clone)]
pub struct CachedRobots {
    /// The parsed robots.txt content
    pub content: ParsedRobots,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    /// Creates a new CachedRobots stamped with the current time
    pub fn new(content: ParsedRobots) -> Self {
        Self {
            content,
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the cached robots.txt is older than 24 hours
    pub fn is_stale(&self) -> bool {
        Utc::now() - self.fetched_at > Duration::hours(24)
    }
}

/// Per-origin robots.txt cache shared by renderer calls
///
/// The lock is held only for map lookups and inserts, never across the
/// robots.txt request itself.
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: Mutex<HashMap<String, CachedRobots>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the robots rules for `origin`, fetching them on a miss
    ///
    /// Any failure to fetch (network error, non-success status) yields an
    /// allow-all policy.
    pub async fn rules_for(&self, client: &Client, origin: &str) -> ParsedRobots {
        {
            let entries = self.entries.lock().await;
            if let Some(cached) = entries.get(origin) {
                if !cached.is_stale() {
                    return cached.content.clone();
                }
            }
        }

        let robots = fetch_robots(client, origin).await;

        let mut entries = self.entries.lock().await;
        entries.insert(origin.to_string(), CachedRobots::new(robots.clone()));
        robots
    }

    /// Number of origins currently cached
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Fetches and parses `<origin>/robots.txt`
pub async fn fetch_robots(client: &Client, origin: &str) -> ParsedRobots {
    let robots_url = format!("{}/robots.txt", origin.trim_end_matches('/'));
    tracing::debug!("Fetching robots.txt: {}", robots_url);

    match client.get(&robots_url).send().await {
        Ok(response) if response.status().is_success() => match response.text().await {
            Ok(body) => ParsedRobots::from_content(&body),
            Err(e) => {
                tracing::debug!("Failed to read robots.txt body from {}: {}", robots_url, e);
                ParsedRobots::allow_all()
            }
        },
        Ok(response) => {
            tracing::debug!(
                "robots.txt at {} returned {}, allowing all",
                robots_url,
                response.status()
            );
            ParsedRobots::allow_all()
        }
        Err(e) => {
            tracing::debug!("Failed to fetch robots.txt from {}: {}", robots_url, e);
            ParsedRobots::allow_all()
        }
    }
}
