//! Trait definition for pluggable search backends.
//!
//! Each backend (DuckDuckGo, Bing, Brave, or anything a caller plugs in)
//! implements [`SearchBackend`] so the aggregator can treat all of them
//! uniformly. The aggregator never branches on an identifier.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::throttle::ThrottleConfig;
use crate::types::SearchResult;

/// A pluggable search backend.
///
/// Implementors handle their own query encoding, transport and parsing, and
/// report completed searches to the shared [`crate::ThrottleGovernor`].
///
/// All implementations must be `Send + Sync` for concurrent fan-out.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Stable, unique, lowercase name.
    fn identifier(&self) -> &str;

    /// Cooldowns registered with the governor when this backend is added
    /// to an aggregator. Defaults to no throttling.
    fn throttle_config(&self) -> ThrottleConfig {
        ThrottleConfig::default()
    }

    /// Run a search and return results in the backend's own ranking order.
    ///
    /// Zero results is a valid `Ok(vec![])`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network or parse failure, or when the
    /// backend detects it is being rate limited.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, BackendError>;

    /// Whether the governor currently refuses searches to this backend.
    ///
    /// Synchronous and free of side effects.
    fn is_rate_limited(&self) -> bool;
}
