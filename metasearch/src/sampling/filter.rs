//! The relevance filter state machine.

use std::sync::Arc;
use std::time::Duration;

use crate::error::SamplingError;
use crate::types::{FilterState, MergedSearchResult, SamplingStatus};

use super::prompt::{build_prompt, parse_selection, Selection};
use super::Sampler;

/// Input to one filter invocation.
#[derive(Debug, Clone)]
pub struct SamplingFilterInput {
    /// The user's query.
    pub query: String,
    /// Merged results in consensus order.
    pub results: Vec<MergedSearchResult>,
    /// Maximum number of results to return.
    pub max_results: usize,
}

/// Result of one filter invocation.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Results to return, at most `max_results`, in consensus order.
    pub results: Vec<MergedSearchResult>,
    /// Terminal state reached.
    pub state: FilterState,
    /// Why the filter failed open, if it did.
    pub error: Option<SamplingError>,
}

impl FilterOutcome {
    fn passthrough(mut results: Vec<MergedSearchResult>, max_results: usize) -> Self {
        results.truncate(max_results);
        Self {
            results,
            state: FilterState::Passthrough,
            error: None,
        }
    }

    fn failed_open(
        mut results: Vec<MergedSearchResult>,
        max_results: usize,
        error: SamplingError,
    ) -> Self {
        results.truncate(max_results);
        Self {
            results,
            state: FilterState::FailedOpen,
            error: Some(error),
        }
    }
}

/// Relevance filter over an optional model.
#[derive(Clone)]
pub struct RelevanceFilter {
    sampler: Option<Arc<dyn Sampler>>,
    timeout: Duration,
}

impl std::fmt::Debug for RelevanceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelevanceFilter")
            .field("model", &self.sampler.as_ref().map(|s| s.model_name()))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RelevanceFilter {
    /// Create a filter around `sampler`, bounding each model call by `timeout`.
    pub fn new(sampler: Option<Arc<dyn Sampler>>, timeout: Duration) -> Self {
        Self { sampler, timeout }
    }

    /// Report whether a model is attached and reachable.
    pub fn status(&self, sampling_enabled: bool) -> SamplingStatus {
        SamplingStatus {
            sampling_enabled,
            model_available: self.sampler.as_ref().is_some_and(|s| s.is_available()),
            model_name: self.sampler.as_ref().map(|s| s.model_name().to_owned()),
        }
    }

    /// Filter `input`, never failing.
    ///
    /// Disabled or without a reachable model, this truncates and returns.
    /// Model failures and unusable answers return the unfiltered list along
    /// with the error.
    pub async fn apply(&self, input: SamplingFilterInput, enabled: bool) -> FilterOutcome {
        let SamplingFilterInput {
            query,
            results,
            max_results,
        } = input;

        let sampler = match &self.sampler {
            Some(s) if enabled && s.is_available() => s,
            _ => return FilterOutcome::passthrough(results, max_results),
        };
        if results.is_empty() {
            return FilterOutcome::passthrough(results, max_results);
        }

        let prompt = build_prompt(&query, &results);
        tracing::trace!(model = sampler.model_name(), candidates = results.len(), "sampling relevance");

        let answer = match tokio::time::timeout(self.timeout, sampler.sample(&prompt)).await {
            Ok(Ok(answer)) => answer,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "relevance sampling failed, returning unfiltered results");
                return FilterOutcome::failed_open(results, max_results, err);
            }
            Err(_) => {
                let err = SamplingError::Timeout(self.timeout);
                tracing::warn!(error = %err, "relevance sampling failed, returning unfiltered results");
                return FilterOutcome::failed_open(results, max_results, err);
            }
        };

        match parse_selection(&answer, results.len()) {
            Selection::Nothing => FilterOutcome {
                results: Vec::new(),
                state: FilterState::Parsed,
                error: None,
            },
            Selection::Indices(indices) => {
                let mut keep = vec![false; results.len()];
                for i in indices {
                    keep[i] = true;
                }
                let mut selected: Vec<MergedSearchResult> = results
                    .into_iter()
                    .zip(keep)
                    .filter_map(|(r, k)| k.then_some(r))
                    .collect();
                selected.truncate(max_results);
                tracing::debug!(kept = selected.len(), "relevance filter applied");
                FilterOutcome {
                    results: selected,
                    state: FilterState::Parsed,
                    error: None,
                }
            }
            Selection::Unusable => {
                let err = SamplingError::Model("answer contained no usable result numbers".into());
                tracing::warn!(error = %err, "relevance sampling failed, returning unfiltered results");
                FilterOutcome::failed_open(results, max_results, err)
            }
        }
    }
}
