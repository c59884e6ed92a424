//! Error types for the metasearch crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. Queries never appear in error messages.

use std::time::Duration;

/// A single backend's query failed.
///
/// Backend errors are isolated: the aggregator records them and carries on
/// with the remaining backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// An HTTP request to the backend failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse the backend's response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The backend is cooling down or answered with a rate-limit response.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The backend did not answer before the fan-out deadline.
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// The relevance filter's model call failed.
///
/// Never surfaces as a search failure; the filter fails open and reports it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SamplingError {
    /// No model is reachable.
    #[error("sampling unavailable: {0}")]
    Unavailable(String),

    /// The model call failed or returned unusable output.
    #[error("model error: {0}")]
    Model(String),

    /// The model did not answer in time.
    #[error("sampling timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Errors that can occur during an aggregate search.
///
/// [`crate::Aggregator::aggregate`] itself only returns [`SearchError::Config`];
/// backend and sampling failures come back inside the response. The
/// `Backend` and `Sampling` variants let callers that need a hard failure
/// lift those reports into one error type, see
/// [`crate::BackendFailure::into_search_error`].
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Invalid configuration or caller contract violation.
    #[error("config error: {0}")]
    Config(String),

    /// A named backend failed.
    #[error("backend {backend} failed: {source}")]
    Backend {
        /// Identifier of the failing backend.
        backend: String,
        /// The underlying failure.
        #[source]
        source: BackendError,
    },

    /// The relevance filter failed.
    #[error(transparent)]
    Sampling(#[from] SamplingError),
}

/// Convenience type alias for metasearch results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_backend_errors() {
        assert_eq!(
            BackendError::Http("connection refused".into()).to_string(),
            "HTTP error: connection refused"
        );
        assert_eq!(
            BackendError::Parse("unexpected HTML structure".into()).to_string(),
            "parse error: unexpected HTML structure"
        );
        assert_eq!(
            BackendError::RateLimited("HTTP 429".into()).to_string(),
            "rate limited: HTTP 429"
        );
        assert_eq!(
            BackendError::Timeout(Duration::from_millis(8000)).to_string(),
            "timed out after 8000ms"
        );
    }

    #[test]
    fn display_sampling_errors() {
        assert_eq!(
            SamplingError::Model("empty completion".into()).to_string(),
            "model error: empty completion"
        );
        assert_eq!(
            SamplingError::Timeout(Duration::from_millis(250)).to_string(),
            "sampling timed out after 250ms"
        );
    }

    #[test]
    fn display_config() {
        let err = SearchError::Config("limit must be greater than 0".into());
        assert_eq!(err.to_string(), "config error: limit must be greater than 0");
    }

    #[test]
    fn display_backend_wrapper_names_backend() {
        let err = SearchError::Backend {
            backend: "bing".into(),
            source: BackendError::Parse("no results container".into()),
        };
        assert_eq!(
            err.to_string(),
            "backend bing failed: parse error: no results container"
        );
    }

    #[test]
    fn sampling_error_converts_transparently() {
        let err: SearchError = SamplingError::Unavailable("no client".into()).into();
        assert_eq!(err.to_string(), "sampling unavailable: no client");
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
        assert_send_sync::<BackendError>();
        assert_send_sync::<SamplingError>();
    }
}
