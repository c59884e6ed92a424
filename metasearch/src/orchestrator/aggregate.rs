//! Core aggregator: throttle-aware concurrent fan-out, merge, rank, filter.
//!
//! Queries every enabled, non-throttled backend concurrently under a single
//! deadline, merges results by normalised URL, ranks them by consensus and
//! optionally passes them through the relevance filter.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::config::AggregatorConfig;
use crate::engine::SearchBackend;
use crate::engines::default_backends;
use crate::error::{BackendError, SearchError};
use crate::sampling::{RelevanceFilter, Sampler, SamplingFilterInput};
use crate::throttle::{Operation, ThrottleGovernor};
use crate::types::{AggregateResponse, BackendFailure, BackendStatus, SamplingStatus};

use super::merge::{merge_ranked_lists, RankedList};

/// Multi-backend search aggregator.
///
/// Holds the registered backends keyed by identifier, the shared throttle
/// governor and the relevance filter. Cheap to share behind an `Arc`;
/// [`Aggregator::aggregate`] takes `&self` and keeps no per-query state.
pub struct Aggregator {
    config: AggregatorConfig,
    governor: Arc<ThrottleGovernor>,
    backends: BTreeMap<String, Arc<dyn SearchBackend>>,
    filter: RelevanceFilter,
}

impl std::fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl Aggregator {
    /// Create an aggregator with no backends.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid.
    pub fn new(
        config: AggregatorConfig,
        governor: Arc<ThrottleGovernor>,
        sampler: Option<Arc<dyn Sampler>>,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        let filter = RelevanceFilter::new(sampler, config.sampling_timeout());
        Ok(Self {
            config,
            governor,
            backends: BTreeMap::new(),
            filter,
        })
    }

    /// Register a backend and its cooldowns with the governor.
    ///
    /// A cooldown override in [`AggregatorConfig::throttle`] takes precedence
    /// over the backend's own [`SearchBackend::throttle_config`]. Registering
    /// an identifier again replaces the previous backend.
    pub fn register(&mut self, backend: Arc<dyn SearchBackend>) {
        let id = backend.identifier().to_owned();
        let throttle = self
            .config
            .throttle
            .get(&id)
            .copied()
            .unwrap_or_else(|| backend.throttle_config());
        self.governor.configure(&id, throttle);
        self.backends.insert(id, backend);
    }

    /// Builder-style [`Aggregator::register`].
    pub fn with_backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.register(backend);
        self
    }

    /// Register the bundled Bing, Brave and DuckDuckGo backends, built from
    /// [`AggregatorConfig::http`] and sharing this aggregator's governor.
    pub fn with_default_backends(mut self) -> Self {
        for backend in default_backends(&self.config.http, &self.governor) {
            self.register(backend);
        }
        self
    }

    /// Identifiers of all registered backends, in sorted order.
    pub fn backend_ids(&self) -> Vec<&str> {
        self.backends.keys().map(String::as_str).collect()
    }

    /// The shared throttle governor.
    pub fn governor(&self) -> &Arc<ThrottleGovernor> {
        &self.governor
    }

    /// Sampling introspection for the outer tool layer.
    pub fn sampling_status(&self) -> SamplingStatus {
        self.filter.status(self.config.sampling.enabled)
    }

    /// Throttle introspection for every registered backend.
    pub fn backend_status(&self) -> Vec<BackendStatus> {
        self.backends
            .iter()
            .map(|(id, backend)| BackendStatus {
                identifier: id.clone(),
                rate_limited: backend.is_rate_limited(),
                retry_after_ms: u64::try_from(
                    self.governor.remaining(id, Operation::Search).as_millis(),
                )
                .unwrap_or(u64::MAX),
            })
            .collect()
    }

    /// Search all enabled backends and return one consensus-ranked list.
    ///
    /// # Pipeline
    ///
    /// 1. Validate the request
    /// 2. Drop enabled backends that are unregistered or rate limited
    /// 3. Fan out concurrently with [`futures::future::join_all`] under one deadline
    /// 4. Record per-backend failures at warn level; keep successful lists
    /// 5. Merge by normalised URL, score by consensus, sort
    /// 6. Truncate to `limit`
    /// 7. Apply the relevance filter when both `sampling_enabled` and
    ///    [`crate::SamplingConfig::enabled`] are set
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] only for caller contract violations:
    /// a zero `limit`, a blank query or no enabled backends. Backend and
    /// sampling failures are reported inside the response.
    pub async fn aggregate<I, S>(
        &self,
        query: &str,
        limit: usize,
        enabled_backends: I,
        sampling_enabled: bool,
    ) -> Result<AggregateResponse, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let enabled: HashSet<String> = enabled_backends
            .into_iter()
            .map(|s| s.as_ref().to_owned())
            .collect();
        validate_request(query, limit, &enabled)?;
        tracing::trace!(query, limit, "aggregate search");

        // 1. Select backends, in identifier order.
        let mut skipped: Vec<String> = enabled
            .iter()
            .filter(|id| !self.backends.contains_key(*id))
            .cloned()
            .collect();
        let mut selected: Vec<(&str, Arc<dyn SearchBackend>)> = Vec::new();
        for (id, backend) in &self.backends {
            if !enabled.contains(id) {
                continue;
            }
            if backend.is_rate_limited() {
                tracing::debug!(backend = %id, "backend throttled, skipping");
                skipped.push(id.clone());
                continue;
            }
            selected.push((id.as_str(), Arc::clone(backend)));
        }
        skipped.sort();

        // 2. Fan out to all selected backends concurrently under one deadline.
        let timeout = self.config.timeout();
        let deadline = tokio::time::Instant::now() + timeout;
        let futures: Vec<_> = selected
            .iter()
            .map(|(id, backend)| {
                let backend = Arc::clone(backend);
                async move {
                    let outcome =
                        tokio::time::timeout_at(deadline, backend.search(query, limit)).await;
                    let outcome = outcome.unwrap_or(Err(BackendError::Timeout(timeout)));
                    (*id, outcome)
                }
            })
            .collect();

        let outcomes = futures::future::join_all(futures).await;

        // 3. Collect lists, recording failures.
        let mut lists: Vec<RankedList> = Vec::new();
        let mut backend_errors: Vec<BackendFailure> = Vec::new();

        for (id, outcome) in outcomes {
            match outcome {
                Ok(results) => {
                    tracing::debug!(backend = id, count = results.len(), "backend returned results");
                    lists.push(RankedList::new(id, results));
                }
                Err(error) => {
                    tracing::warn!(backend = id, error = %error, "backend query failed");
                    backend_errors.push(BackendFailure {
                        backend: id.to_owned(),
                        error,
                    });
                }
            }
        }

        // 4. Merge, score, sort, truncate.
        let mut merged = merge_ranked_lists(&lists, limit);
        merged.truncate(limit);

        // 5. Relevance filter, only when configuration also allows it.
        let sampling_enabled = sampling_enabled && self.config.sampling.enabled;
        let outcome = self
            .filter
            .apply(
                SamplingFilterInput {
                    query: query.to_owned(),
                    results: merged,
                    max_results: limit,
                },
                sampling_enabled,
            )
            .await;

        Ok(AggregateResponse {
            results: outcome.results,
            backend_errors,
            skipped,
            sampling: outcome.state,
            sampling_error: outcome.error,
        })
    }
}

fn validate_request(
    query: &str,
    limit: usize,
    enabled: &HashSet<String>,
) -> Result<(), SearchError> {
    if limit == 0 {
        return Err(SearchError::Config("limit must be greater than 0".into()));
    }
    if query.trim().is_empty() {
        return Err(SearchError::Config("query must not be empty".into()));
    }
    if enabled.is_empty() {
        return Err(SearchError::Config(
            "at least one backend must be enabled".into(),
        ));
    }
    Ok(())
}
