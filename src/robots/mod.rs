//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching
//! robots.txt files, consulted by the HTTP renderer before every page fetch.

mod cache;
mod parser;

pub use cache::{fetch_robots, CachedRobots, RobotsCache};
pub use parser::ParsedRobots;

/// Checks if a URL is allowed by robots.txt
pub fn is_allowed(robots: &ParsedRobots, url: &str, user_agent: &str) -> bool {
    robots.is_allowed(url, user_agent)
}
