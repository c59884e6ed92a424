//! # metasearch
//!
//! Throttle-aware web search aggregation.
//!
//! An [`Aggregator`] fans one query out to every enabled search backend at
//! once, merges the ranked lists it gets back by normalised URL and orders
//! the merged results by cross-backend consensus. An optional language model
//! can then prune results that do not match the query.
//!
//! ## Design
//!
//! - Backends are trait objects behind [`SearchBackend`]; the aggregator
//!   never special-cases one
//! - A shared [`ThrottleGovernor`] remembers when each backend was last
//!   used and excludes backends still cooling down
//! - One deadline bounds the whole fan-out; a slow or failing backend is
//!   reported in the response and never fails the query
//! - Results found by more backends always outrank results found by fewer
//! - The relevance filter fails open: any model trouble returns the
//!   unfiltered list
//! - Bundled DuckDuckGo, Bing and Brave scrapers in [`engines`]
//!
//! ## Security
//!
//! - No API keys or secrets
//! - No network listeners: this is a library, not a server
//! - Search queries are logged only at trace level
//!
//! ## Example
//!
//! ```no_run
//! # async fn example() -> metasearch::Result<()> {
//! use std::sync::Arc;
//! use metasearch::{Aggregator, AggregatorConfig, ThrottleGovernor};
//!
//! let aggregator = Aggregator::new(
//!     AggregatorConfig::default(),
//!     Arc::new(ThrottleGovernor::new()),
//!     None,
//! )?
//! .with_default_backends();
//!
//! let response = aggregator
//!     .aggregate("rust programming", 10, ["bing", "brave", "duckduckgo"], false)
//!     .await?;
//! for result in &response.results {
//!     println!("{} [{}]: {}", result.title, result.engines.join(", "), result.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod sampling;
pub mod throttle;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AggregatorConfig, HttpConfig, SamplingConfig};
pub use engine::SearchBackend;
pub use error::{BackendError, Result, SamplingError, SearchError};
pub use orchestrator::Aggregator;
pub use sampling::{RelevanceFilter, Sampler};
pub use throttle::{Operation, ThrottleConfig, ThrottleGovernor, ThrottleState};
pub use types::{
    AggregateResponse, BackendFailure, BackendStatus, FilterState, MergedSearchResult,
    SamplingStatus, SearchResult,
};

/// Search every bundled backend with the default configuration.
///
/// Convenience wrapper that builds a fresh [`Aggregator`] with its own
/// governor, so cooldowns are not shared with other callers. Long-lived
/// callers should keep one [`Aggregator`] instead.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for a zero `limit` or a blank query.
pub async fn search_default(query: &str, limit: usize) -> Result<Vec<MergedSearchResult>> {
    let aggregator = Aggregator::new(
        AggregatorConfig::default(),
        std::sync::Arc::new(ThrottleGovernor::new()),
        None,
    )?
    .with_default_backends();
    let ids: Vec<String> = aggregator
        .backend_ids()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let response = aggregator.aggregate(query, limit, ids, false).await?;
    Ok(response.results)
}
