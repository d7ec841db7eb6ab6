//! Breadth-first crawl frontier
//!
//! This module handles:
//! - The FIFO queue of pending crawl targets
//! - Visited/enqueued membership with O(1) test-and-set
//! - Final URLs pages landed on after redirects
//! - Content signatures of accepted pages
//! - Per-target visit state and the visitation order
//!
//! The frontier is owned by a single coordinator, so none of this state is
//! shared or locked.

use crate::crawler::report::VisitRecord;
use crate::state::VisitState;
use std::collections::{HashMap, HashSet, VecDeque};

/// A URL scheduled for processing at a given depth
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrawlTarget {
    pub url: String,
    pub depth: u32,
}

impl CrawlTarget {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Queue, membership sets and visit bookkeeping for one crawl
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<CrawlTarget>,
    visited: HashSet<String>,
    enqueued: HashSet<String>,
    landed: HashSet<String>,
    signatures: HashSet<String>,
    states: HashMap<String, VisitState>,
    visit_log: Vec<CrawlTarget>,
}

impl Frontier {
    /// Creates a frontier seeded with the start target
    pub fn new(start: CrawlTarget) -> Self {
        let mut frontier = Self::default();
        frontier.enqueue(start);
        frontier
    }

    /// Adds a target to the back of the queue
    ///
    /// Returns false (and does nothing) if the URL was already enqueued or
    /// visited.
    pub fn enqueue(&mut self, target: CrawlTarget) -> bool {
        if self.is_known(&target.url) {
            return false;
        }
        self.enqueued.insert(target.url.clone());
        self.states.insert(target.url.clone(), VisitState::Enqueued);
        self.queue.push_back(target);
        true
    }

    /// Removes and returns the oldest pending target
    pub fn pop(&mut self) -> Option<CrawlTarget> {
        self.queue.pop_front()
    }

    /// Marks a target visited; returns false if it already was
    ///
    /// Visited targets are appended to the visitation order exactly once.
    pub fn mark_visited(&mut self, target: &CrawlTarget) -> bool {
        if !self.visited.insert(target.url.clone()) {
            return false;
        }
        self.visit_log.push(target.clone());
        true
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// True if the URL was ever enqueued or visited
    pub fn is_known(&self, url: &str) -> bool {
        self.visited.contains(url) || self.enqueued.contains(url)
    }

    /// Remembers the final URL a fetched page was served from
    pub fn record_landing(&mut self, url: impl Into<String>) {
        self.landed.insert(url.into());
    }

    pub fn is_landed(&self, url: &str) -> bool {
        self.landed.contains(url)
    }

    /// Inserts a content signature; returns false if it was already present
    pub fn insert_signature(&mut self, signature: String) -> bool {
        self.signatures.insert(signature)
    }

    /// Moves a URL to `state` if the transition is legal
    pub fn set_state(&mut self, url: &str, state: VisitState) -> bool {
        match self.states.get_mut(url) {
            Some(current) if current.can_transition_to(state) => {
                *current = state;
                true
            }
            Some(_) => false,
            None => {
                self.states.insert(url.to_string(), state);
                true
            }
        }
    }

    pub fn state_of(&self, url: &str) -> Option<VisitState> {
        self.states.get(url).copied()
    }

    /// Drops pending targets beyond the first `max_len`
    ///
    /// Dropped URLs stay in the enqueued set, so they are not rediscovered.
    /// Returns the number of targets dropped.
    pub fn truncate(&mut self, max_len: usize) -> usize {
        let before = self.queue.len();
        self.queue.truncate(max_len);
        before - self.queue.len()
    }

    /// Number of pending targets
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// URLs in the order they were visited
    pub fn urls_seen(&self) -> Vec<String> {
        self.visit_log.iter().map(|t| t.url.clone()).collect()
    }

    /// Visited targets with their final state, in visitation order
    pub fn visit_records(&self) -> Vec<VisitRecord> {
        self.visit_log
            .iter()
            .map(|target| VisitRecord {
                url: target.url.clone(),
                depth: target.depth,
                state: self
                    .state_of(&target.url)
                    .unwrap_or(VisitState::Enqueued),
            })
            .collect()
    }
}
