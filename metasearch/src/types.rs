//! Core types for raw backend results and merged, consensus-ranked results.

use serde::{Deserialize, Serialize};

use crate::error::{BackendError, SamplingError, SearchError};

/// A single result returned by one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result page.
    pub title: String,
    /// The URL of the result, as the backend reported it.
    pub url: String,
    /// A text snippet describing the page.
    pub description: String,
    /// Display origin of the result, usually the page's host name.
    pub source: String,
    /// Identifier of the backend that returned this result.
    pub engine: String,
}

/// One result after cross-backend merging.
///
/// `engines[i]` returned this URL at 1-based position `ranks[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedSearchResult {
    /// Digest of the normalised URL; the merge identity.
    pub url_hash: String,
    /// The URL as first seen.
    pub url: String,
    /// Longest non-empty title among contributors.
    pub title: String,
    /// Longest non-empty description among contributors.
    pub description: String,
    /// Contributing backend identifiers, without duplicates.
    pub engines: Vec<String>,
    /// Rank contributed by each entry of `engines`.
    pub ranks: Vec<usize>,
    /// Higher is better. More engines always outrank fewer.
    pub consensus_score: i64,
}

impl MergedSearchResult {
    /// The best (lowest) rank any contributor gave this result.
    pub fn best_rank(&self) -> usize {
        self.ranks.iter().copied().min().unwrap_or(usize::MAX)
    }

    /// Number of backends that returned this result.
    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }
}

/// An isolated failure of one backend during an aggregate search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendFailure {
    /// Identifier of the failing backend.
    pub backend: String,
    /// What went wrong.
    #[serde(serialize_with = "serialize_display")]
    pub error: BackendError,
}

impl BackendFailure {
    /// Convert into a [`SearchError::Backend`] naming the backend.
    pub fn into_search_error(self) -> SearchError {
        SearchError::Backend {
            backend: self.backend,
            source: self.error,
        }
    }
}

/// Terminal state of one relevance-filter invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterState {
    /// Sampling was disabled or no model was available.
    Passthrough,
    /// The model's answer was parsed and applied.
    Parsed,
    /// The model failed or answered unusably; input returned unfiltered.
    FailedOpen,
}

/// Everything an aggregate search produced.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateResponse {
    /// Final ranked results, at most `limit` long.
    pub results: Vec<MergedSearchResult>,
    /// Backends that were called and failed.
    pub backend_errors: Vec<BackendFailure>,
    /// Enabled backends that were not called (throttled or unregistered).
    pub skipped: Vec<String>,
    /// What the relevance filter did.
    pub sampling: FilterState,
    /// Why the relevance filter failed open, if it did.
    #[serde(serialize_with = "serialize_display_opt")]
    pub sampling_error: Option<SamplingError>,
}

/// Sampling introspection for the outer tool layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingStatus {
    /// Whether sampling is enabled in configuration.
    pub sampling_enabled: bool,
    /// Whether a model is currently reachable.
    pub model_available: bool,
    /// Name of the model, when one is attached.
    pub model_name: Option<String>,
}

/// Throttle introspection for one registered backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Backend identifier.
    pub identifier: String,
    /// Whether a search right now would be refused.
    pub rate_limited: bool,
    /// Milliseconds until the next search is allowed.
    pub retry_after_ms: u64,
}

fn serialize_display<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: std::fmt::Display,
{
    serializer.collect_str(value)
}

fn serialize_display_opt<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: std::fmt::Display,
{
    match value {
        Some(v) => serializer.collect_str(v),
        None => serializer.serialize_none(),
    }
}
