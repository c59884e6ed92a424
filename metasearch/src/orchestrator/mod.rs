//! Search orchestrator: throttle-aware fan-out, merge, consensus ranking.
//!
//! This module fans out queries to every enabled backend concurrently,
//! merges results by normalised URL, scores them by cross-backend consensus
//! and returns a sorted, truncated, optionally relevance-filtered list.

pub mod aggregate;
pub mod merge;
pub mod scoring;
pub mod url_normalize;

pub use aggregate::Aggregator;
