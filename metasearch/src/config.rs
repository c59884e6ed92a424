//! Aggregator configuration with sensible defaults.
//!
//! [`AggregatorConfig`] controls the fan-out deadline, the relevance filter,
//! HTTP behaviour of the bundled backends and per-backend throttle
//! overrides. Every field has a default, so a partial TOML document is a
//! valid configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::throttle::ThrottleConfig;

/// Top-level configuration for an [`crate::Aggregator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Deadline for the whole backend fan-out, in milliseconds.
    pub timeout_ms: u64,
    /// Relevance filter settings.
    pub sampling: SamplingConfig,
    /// HTTP settings shared by the bundled backends.
    pub http: HttpConfig,
    /// Per-backend cooldown overrides keyed by identifier.
    pub throttle: HashMap<String, ThrottleConfig>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 8000,
            sampling: SamplingConfig::default(),
            http: HttpConfig::default(),
            throttle: HashMap::new(),
        }
    }
}

/// Relevance filter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Whether the filter is enabled.
    pub enabled: bool,
    /// Deadline for one model call, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_ms: 15_000,
        }
    }
}

/// HTTP settings for the bundled scraping backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Whether to request safe search filtering from backends that support it.
    pub safe_search: bool,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 8,
            safe_search: true,
            user_agent: None,
        }
    }
}

impl AggregatorConfig {
    /// Parse a TOML document and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] on malformed TOML or invalid values.
    pub fn from_toml_str(raw: &str) -> Result<Self, SearchError> {
        let config: Self =
            toml::from_str(raw).map_err(|e| SearchError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_ms` must be greater than 0
    /// - `sampling.timeout_ms` must be greater than 0
    /// - `http.timeout_seconds` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_ms == 0 {
            return Err(SearchError::Config(
                "timeout_ms must be greater than 0".into(),
            ));
        }
        if self.sampling.timeout_ms == 0 {
            return Err(SearchError::Config(
                "sampling.timeout_ms must be greater than 0".into(),
            ));
        }
        if self.http.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "http.timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// The fan-out deadline as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The per-call sampling deadline as a [`Duration`].
    pub fn sampling_timeout(&self) -> Duration {
        Duration::from_millis(self.sampling.timeout_ms)
    }
}
