//! DuckDuckGo backend over the HTML-only endpoint.
//!
//! Uses the HTML-only version at `https://html.duckduckgo.com/html/`
//! which requires no JavaScript and is tolerant of automated requests.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::config::HttpConfig;
use crate::engine::SearchBackend;
use crate::error::BackendError;
use crate::http;
use crate::throttle::{ThrottleConfig, ThrottleGovernor};
use crate::types::SearchResult;

use super::{parse_results, ResultLayout};

const LAYOUT: ResultLayout = ResultLayout {
    container: ".result.results_links.results_links_deep:not(.result--ad), .web-result:not(.result--ad)",
    title: ".result__a",
    link: ".result__a",
    description: ".result__snippet",
};

/// DuckDuckGo HTML search backend.
///
/// Single page per search; DuckDuckGo's HTML endpoint is the most likely to
/// answer repeated automated queries, but it does throttle bursts.
#[derive(Debug, Clone)]
pub struct DuckDuckGoBackend {
    http: HttpConfig,
    governor: Arc<ThrottleGovernor>,
}

impl DuckDuckGoBackend {
    /// Stable identifier.
    pub const ID: &'static str = "duckduckgo";

    /// Create the backend, reporting completed searches to `governor`.
    pub fn new(http: HttpConfig, governor: Arc<ThrottleGovernor>) -> Self {
        Self { http, governor }
    }

    /// Extract the actual URL from DuckDuckGo's redirect wrapper.
    ///
    /// DDG wraps URLs like: `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`
    fn extract_url(href: &str) -> Option<String> {
        let full_href = if href.starts_with("//") {
            format!("https:{href}")
        } else {
            href.to_string()
        };

        let parsed = Url::parse(&full_href).ok()?;

        if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        } else {
            Some(full_href)
        }
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoBackend {
    fn identifier(&self) -> &str {
        Self::ID
    }

    fn throttle_config(&self) -> ThrottleConfig {
        ThrottleConfig::new(2000, 1000)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, BackendError> {
        if self.governor.is_throttled(Self::ID) {
            return Err(BackendError::RateLimited("DuckDuckGo is cooling down".into()));
        }
        tracing::trace!(query, "DuckDuckGo search");

        let client = http::build_client(&self.http)?;

        let mut params = vec![("q", query)];
        if self.http.safe_search {
            params.push(("kp", "1"));
        }

        let request = client
            .post("https://html.duckduckgo.com/html/")
            .form(&params)
            .header("Accept-Language", "en-US,en;q=0.9");
        let body = http::fetch_text("DuckDuckGo", request).await;
        self.governor.record_page(Self::ID);
        self.governor.record_search(Self::ID);

        parse_duckduckgo_html(&body?, limit)
    }

    fn is_rate_limited(&self) -> bool {
        self.governor.is_throttled(Self::ID)
    }
}

/// Parse a DuckDuckGo HTML results page.
pub(crate) fn parse_duckduckgo_html(
    html: &str,
    limit: usize,
) -> Result<Vec<SearchResult>, BackendError> {
    parse_results(
        html,
        LAYOUT,
        DuckDuckGoBackend::ID,
        limit,
        DuckDuckGoBackend::extract_url,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_DDG_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.rust-lang.org%2F&amp;rut=abc123">
        Rust Programming Language
    </a>
    <div class="result__snippet">
        A language empowering everyone to build reliable and efficient software.
    </div>
</div>
<div class="result results_links results_links_deep web-result result--ad">
    <a class="result__a" href="https://ads.example.com/">Sponsored</a>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="https://doc.rust-lang.org/book/">
        The Rust Programming Language Book
    </a>
    <div class="result__snippet">An introductory book about Rust.</div>
</div>
<div class="result results_links results_links_deep web-result">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FRust_(programming_language)&amp;rut=def456">
        Rust (programming language) - Wikipedia
    </a>
    <div class="result__snippet">
        Rust is a multi-paradigm, general-purpose programming language.
    </div>
</div>
</body>
</html>"#;

    #[test]
    fn extract_url_from_ddg_redirect() {
        let href = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc";
        assert_eq!(
            DuckDuckGoBackend::extract_url(href),
            Some("https://example.com/page".to_string())
        );
    }

    #[test]
    fn extract_url_direct_link() {
        let href = "https://example.com/direct";
        assert_eq!(
            DuckDuckGoBackend::extract_url(href),
            Some("https://example.com/direct".to_string())
        );
    }

    #[test]
    fn extract_url_invalid() {
        assert!(DuckDuckGoBackend::extract_url("not-a-url").is_none());
    }

    #[test]
    fn parse_mock_html_skips_ads_and_unwraps_redirects() {
        let results = parse_duckduckgo_html(MOCK_DDG_HTML, 10).expect("should parse");
        assert_eq!(results.len(), 3);

        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[0].source, "rust-lang.org");
        assert!(results[0].description.contains("reliable and efficient"));
        assert_eq!(results[0].engine, "duckduckgo");

        assert_eq!(results[1].url, "https://doc.rust-lang.org/book/");
        assert!(results[2].url.contains("wikipedia.org"));
        assert!(results.iter().all(|r| !r.url.contains("duckduckgo.com/l/")));
    }

    #[test]
    fn parse_respects_limit() {
        let results = parse_duckduckgo_html(MOCK_DDG_HTML, 2).expect("should parse");
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn parse_empty_html_returns_empty() {
        let results = parse_duckduckgo_html("<html><body></body></html>", 10).expect("parse");
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn refuses_search_while_cooling_down() {
        let governor = Arc::new(ThrottleGovernor::new());
        let backend = DuckDuckGoBackend::new(HttpConfig::default(), governor.clone());
        governor.configure(DuckDuckGoBackend::ID, backend.throttle_config());
        governor.record_search(DuckDuckGoBackend::ID);

        assert!(backend.is_rate_limited());
        let err = backend.search("rust", 5).await.unwrap_err();
        assert!(matches!(err, BackendError::RateLimited(_)));
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DuckDuckGoBackend>();
    }

    #[tokio::test]
    #[ignore] // live network test
    async fn live_duckduckgo_search() {
        let backend =
            DuckDuckGoBackend::new(HttpConfig::default(), Arc::new(ThrottleGovernor::new()));
        let results = backend.search("rust programming", 10).await;
        let results = results.expect("live search should work");
        assert!(!results.is_empty());
    }
}
