//! Bing backend.
//!
//! Bing serves about ten organic results per page, so a search with a
//! larger limit walks up to [`MAX_PAGES`] pages using the `first=` offset,
//! waiting out the page cooldown between requests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::HttpConfig;
use crate::engine::SearchBackend;
use crate::error::BackendError;
use crate::http;
use crate::throttle::{Operation, ThrottleConfig, ThrottleGovernor};
use crate::types::SearchResult;

use super::{absolute_http, parse_results, ResultLayout};

/// Upper bound on result pages fetched for one search.
pub const MAX_PAGES: usize = 3;

const RESULTS_PER_PAGE: usize = 10;

const LAYOUT: ResultLayout = ResultLayout {
    container: "li.b_algo",
    title: "h2",
    link: "h2 a",
    description: ".b_caption p, .b_lineclamp2",
};

/// Bing HTML search scraper.
#[derive(Debug, Clone)]
pub struct BingBackend {
    http: HttpConfig,
    governor: Arc<ThrottleGovernor>,
}

impl BingBackend {
    /// Stable identifier.
    pub const ID: &'static str = "bing";

    /// Create the backend, reporting searches and pages to `governor`.
    pub fn new(http: HttpConfig, governor: Arc<ThrottleGovernor>) -> Self {
        Self { http, governor }
    }

    async fn fetch_page(
        &self,
        client: &reqwest::Client,
        query: &str,
        page: usize,
    ) -> Result<String, BackendError> {
        let safe_search = if self.http.safe_search { "Strict" } else { "Off" };
        let first = (1 + RESULTS_PER_PAGE * page).to_string();

        let request = client
            .get("https://www.bing.com/search")
            .query(&[
                ("q", query),
                ("setlang", "en"),
                ("safeSearch", safe_search),
                ("first", first.as_str()),
            ])
            .header("Accept", "text/html,application/xhtml+xml")
            .header("Accept-Language", "en-US,en;q=0.9");

        let body = http::fetch_text("Bing", request).await;
        self.governor.record_page(Self::ID);
        body
    }
}

#[async_trait]
impl SearchBackend for BingBackend {
    fn identifier(&self) -> &str {
        Self::ID
    }

    fn throttle_config(&self) -> ThrottleConfig {
        ThrottleConfig::new(1000, 500)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, BackendError> {
        if self.governor.is_throttled(Self::ID) {
            return Err(BackendError::RateLimited("Bing is cooling down".into()));
        }
        tracing::trace!(query, "Bing search");

        let client = http::build_client(&self.http)?;
        let outcome = self.collect_pages(&client, query, limit).await;
        self.governor.record_search(Self::ID);
        outcome
    }

    fn is_rate_limited(&self) -> bool {
        self.governor.is_throttled(Self::ID)
    }
}

impl BingBackend {
    async fn collect_pages(
        &self,
        client: &reqwest::Client,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, BackendError> {
        let mut results: Vec<SearchResult> = Vec::new();

        for page in 0..MAX_PAGES {
            if results.len() >= limit {
                break;
            }
            if page > 0 {
                let wait = self.governor.remaining(Self::ID, Operation::Page);
                if !wait.is_zero() {
                    tokio::time::sleep(wait).await;
                }
            }

            let html = match self.fetch_page(client, query, page).await {
                Ok(html) => html,
                // Later pages only top up the list; keep what we have.
                Err(err) if !results.is_empty() => {
                    tracing::debug!(page, error = %err, "Bing paging stopped");
                    break;
                }
                Err(err) => return Err(err),
            };

            let before = results.len();
            for result in parse_bing_html(&html, limit)? {
                if results.len() >= limit {
                    break;
                }
                if !results.iter().any(|r| r.url == result.url) {
                    results.push(result);
                }
            }
            if results.len() == before {
                break;
            }
        }

        Ok(results)
    }
}

/// Parse one Bing results page.
pub(crate) fn parse_bing_html(html: &str, limit: usize) -> Result<Vec<SearchResult>, BackendError> {
    parse_results(html, LAYOUT, BingBackend::ID, limit, absolute_http)
}
