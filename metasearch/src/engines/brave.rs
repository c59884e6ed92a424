//! Brave Search backend.
//!
//! Brave runs its own crawler and index, so its results add an independent
//! vote to the consensus score next to Bing and DuckDuckGo.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::HttpConfig;
use crate::engine::SearchBackend;
use crate::error::BackendError;
use crate::http;
use crate::throttle::{ThrottleConfig, ThrottleGovernor};
use crate::types::SearchResult;

use super::{absolute_http, parse_results, ResultLayout};

const LAYOUT: ResultLayout = ResultLayout {
    container: r#"div.snippet[data-type="web"]"#,
    title: ".title",
    link: "a",
    description: ".snippet-description",
};

/// Brave Search HTML scraper.
#[derive(Debug, Clone)]
pub struct BraveBackend {
    http: HttpConfig,
    governor: Arc<ThrottleGovernor>,
}

impl BraveBackend {
    /// Stable identifier.
    pub const ID: &'static str = "brave";

    /// Create the backend, reporting completed searches to `governor`.
    pub fn new(http: HttpConfig, governor: Arc<ThrottleGovernor>) -> Self {
        Self { http, governor }
    }
}

#[async_trait]
impl SearchBackend for BraveBackend {
    fn identifier(&self) -> &str {
        Self::ID
    }

    fn throttle_config(&self) -> ThrottleConfig {
        ThrottleConfig::new(1500, 1000)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, BackendError> {
        if self.governor.is_throttled(Self::ID) {
            return Err(BackendError::RateLimited("Brave is cooling down".into()));
        }
        tracing::trace!(query, "Brave search");

        let client = http::build_client(&self.http)?;
        let safe_search = if self.http.safe_search { "strict" } else { "off" };

        let request = client
            .get("https://search.brave.com/search")
            .query(&[("q", query), ("source", "web"), ("safesearch", safe_search)])
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9");
        let body = http::fetch_text("Brave", request).await;
        self.governor.record_page(Self::ID);
        self.governor.record_search(Self::ID);

        parse_brave_html(&body?, limit)
    }

    fn is_rate_limited(&self) -> bool {
        self.governor.is_throttled(Self::ID)
    }
}

pub(crate) fn parse_brave_html(html: &str, limit: usize) -> Result<Vec<SearchResult>, BackendError> {
    parse_results(html, LAYOUT, BraveBackend::ID, limit, absolute_http)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_BRAVE_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div id="results">
  <div class="snippet" data-type="web">
    <a href="https://www.rust-lang.org/"><div class="title">Rust Programming Language</div></a>
    <div class="snippet-description">Build reliable and efficient software.</div>
  </div>
  <div class="snippet" data-type="news">
    <a href="https://news.example.com/rust"><div class="title">Rust news</div></a>
  </div>
  <div class="snippet" data-type="web">
    <a href="https://tokio.rs/"><div class="title">Tokio</div></a>
  </div>
</div>
</body>
</html>"#;

    #[test]
    fn parse_mock_html_keeps_web_results_only() {
        let results = parse_brave_html(MOCK_BRAVE_HTML, 10).expect("should parse");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[0].description, "Build reliable and efficient software.");
        assert_eq!(results[0].engine, "brave");
        assert_eq!(results[1].url, "https://tokio.rs/");
        assert_eq!(results[1].description, "");
    }

    #[test]
    fn cooldowns() {
        let backend = BraveBackend::new(HttpConfig::default(), Arc::new(ThrottleGovernor::new()));
        assert_eq!(backend.throttle_config(), ThrottleConfig::new(1500, 1000));
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BraveBackend>();
    }

    #[tokio::test]
    #[ignore] // live network test
    async fn live_brave_search() {
        let backend = BraveBackend::new(HttpConfig::default(), Arc::new(ThrottleGovernor::new()));
        let results = backend.search("rust programming", 10).await;
        assert!(!results.expect("live search should work").is_empty());
    }
}
