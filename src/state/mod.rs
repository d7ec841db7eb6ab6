//! State module for tracking crawl progress
//!
//! `VisitState` tracks each crawl target from the moment it is enqueued to
//! the single terminal decision made when it is dequeued.

mod page_state;

pub use page_state::VisitState;
