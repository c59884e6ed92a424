//! Per-backend throttle governor.
//!
//! Tracks, for every backend identifier, when its last search and last
//! result-page fetch completed, and decides whether a new operation must
//! wait. Backends are independent: a cooling-down backend never delays
//! another one.
//!
//! ```text
//!            record_search                  cooldown elapsed
//! ┌───────┐ ──────────────► ┌───────────┐ ─────────────────► ┌───────┐
//! │ Ready │                 │ Throttled │                    │ Ready │
//! └───────┘                 └───────────┘                    └───────┘
//! ```
//!
//! Timestamps are recorded when an operation *completes*, so a slow request
//! never shrinks the gap before the next one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};

/// Static cooldowns for one backend. A cooldown of `0` never throttles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Minimum gap between two searches, in milliseconds.
    pub search_cooldown_ms: u64,
    /// Minimum gap between two result-page fetches, in milliseconds.
    pub page_cooldown_ms: u64,
}

impl ThrottleConfig {
    /// Build a config from the two cooldowns.
    pub const fn new(search_cooldown_ms: u64, page_cooldown_ms: u64) -> Self {
        Self {
            search_cooldown_ms,
            page_cooldown_ms,
        }
    }

    fn cooldown(&self, op: Operation) -> Duration {
        match op {
            Operation::Search => Duration::from_millis(self.search_cooldown_ms),
            Operation::Page => Duration::from_millis(self.page_cooldown_ms),
        }
    }
}

/// Last-operation timestamps for one backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThrottleState {
    /// When the last search completed.
    pub last_search_at: Option<Instant>,
    /// When the last result page was fetched.
    pub last_page_at: Option<Instant>,
}

impl ThrottleState {
    fn last(&self, op: Operation) -> Option<Instant> {
        match op {
            Operation::Search => self.last_search_at,
            Operation::Page => self.last_page_at,
        }
    }
}

/// The kind of operation being gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// A search request.
    Search,
    /// A follow-up result page.
    Page,
}

#[derive(Debug, Default)]
struct Entry {
    config: ThrottleConfig,
    state: ThrottleState,
}

/// Process-wide registry of per-backend cooldowns.
///
/// Shared by `Arc` between the aggregator and every backend. All access
/// goes through one mutex whose critical sections are a map lookup and a
/// timestamp read or write.
pub struct ThrottleGovernor {
    clock: Arc<dyn Clock>,
    backends: Mutex<HashMap<String, Entry>>,
}

impl std::fmt::Debug for ThrottleGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThrottleGovernor")
            .field("backends", &self.lock().len())
            .finish_non_exhaustive()
    }
}

impl Default for ThrottleGovernor {
    fn default() -> Self {
        Self::new()
    }
}

impl ThrottleGovernor {
    /// Create a governor on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a governor on a caller-supplied clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            backends: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.backends.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register or overwrite the cooldowns for `name`.
    ///
    /// Idempotent; the last call wins. Recorded timestamps are kept.
    pub fn configure(&self, name: &str, config: ThrottleConfig) {
        let mut backends = self.lock();
        backends.entry(name.to_owned()).or_default().config = config;
        tracing::debug!(
            backend = name,
            search_cooldown_ms = config.search_cooldown_ms,
            page_cooldown_ms = config.page_cooldown_ms,
            "throttle configured"
        );
    }

    /// The cooldowns registered for `name`, if any.
    pub fn config(&self, name: &str) -> Option<ThrottleConfig> {
        self.lock().get(name).map(|e| e.config)
    }

    /// The recorded timestamps for `name`, if any.
    pub fn state(&self, name: &str) -> Option<ThrottleState> {
        self.lock().get(name).map(|e| e.state)
    }

    /// Whether a search against `name` would fall inside its cooldown.
    ///
    /// A backend with no recorded search is never throttled.
    pub fn is_throttled(&self, name: &str) -> bool {
        !self.remaining(name, Operation::Search).is_zero()
    }

    /// Whether a page fetch against `name` would fall inside its cooldown.
    pub fn is_page_throttled(&self, name: &str) -> bool {
        !self.remaining(name, Operation::Page).is_zero()
    }

    /// Time left before `op` is allowed against `name`; zero when allowed.
    pub fn remaining(&self, name: &str, op: Operation) -> Duration {
        let now = self.clock.now();
        let backends = self.lock();
        let Some(entry) = backends.get(name) else {
            return Duration::ZERO;
        };
        let cooldown = entry.config.cooldown(op);
        match entry.state.last(op) {
            Some(last) if !cooldown.is_zero() => {
                cooldown.saturating_sub(now.saturating_duration_since(last))
            }
            _ => Duration::ZERO,
        }
    }

    /// Record that a search against `name` just completed.
    pub fn record_search(&self, name: &str) {
        self.record(name, Operation::Search);
    }

    /// Record that a result page from `name` was just fetched.
    pub fn record_page(&self, name: &str) {
        self.record(name, Operation::Page);
    }

    fn record(&self, name: &str, op: Operation) {
        let now = self.clock.now();
        let mut backends = self.lock();
        let state = &mut backends.entry(name.to_owned()).or_default().state;
        match op {
            Operation::Search => state.last_search_at = Some(now),
            Operation::Page => state.last_page_at = Some(now),
        }
    }
}
