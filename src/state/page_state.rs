/// Visit state definitions for crawl targets
///
/// A target is `Enqueued` when placed on the frontier and moves to exactly
/// one terminal state when dequeued and processed.
use serde::Serialize;
use std::fmt;

/// Represents the state of a single crawl target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitState {
    // ===== Active State =====
    /// Target sits on the frontier waiting to be dequeued
    Enqueued,

    // ===== Terminal States =====
    /// Target was fetched and its content kept in the results
    Accepted,

    /// Content signature matched an earlier page; dropped, links not followed
    Duplicate,

    /// Low-quality path marker; dropped from results but links still followed
    Filtered,

    /// Fetch, render or extraction failed; recorded as an error result
    Error,

    /// Dequeued but rejected before any fetch (revisit, recursive path, off-domain)
    Skipped,
}

impl VisitState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Enqueued)
    }

    /// Returns true if the target contributed an entry to the results
    pub fn produces_result(&self) -> bool {
        matches!(self, Self::Accepted | Self::Error)
    }

    /// Returns true if outbound links of the target may be followed
    pub fn follows_links(&self) -> bool {
        matches!(self, Self::Accepted | Self::Filtered)
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    ///
    /// Only `Enqueued -> terminal` is allowed; terminal states never change.
    pub fn can_transition_to(&self, next: VisitState) -> bool {
        matches!(self, Self::Enqueued) && next.is_terminal()
    }

    /// Converts the state to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Enqueued => "enqueued",
            Self::Accepted => "accepted",
            Self::Duplicate => "duplicate",
            Self::Filtered => "filtered",
            Self::Error => "error",
            Self::Skipped => "skipped",
        }
    }

    /// Parses a state from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "enqueued" => Some(Self::Enqueued),
            "accepted" => Some(Self::Accepted),
            "duplicate" => Some(Self::Duplicate),
            "filtered" => Some(Self::Filtered),
            "error" => Some(Self::Error),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// Returns all terminal states
    pub fn terminal_states() -> [Self; 5] {
        [
            Self::Accepted,
            Self::Duplicate,
            Self::Filtered,
            Self::Error,
            Self::Skipped,
        ]
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
