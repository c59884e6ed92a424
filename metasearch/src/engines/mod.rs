//! Bundled scraping backends.
//!
//! Each module provides a struct implementing [`crate::engine::SearchBackend`]
//! that scrapes one search engine's HTML results page. They share the HTML
//! extraction in [`parse_results`]; only the CSS layout and link unwrapping
//! differ per engine.

pub mod bing;
pub mod brave;
pub mod duckduckgo;

use std::sync::Arc;

use scraper::{Html, Selector};

use crate::config::HttpConfig;
use crate::engine::SearchBackend;
use crate::error::BackendError;
use crate::http::source_of;
use crate::throttle::ThrottleGovernor;
use crate::types::SearchResult;

pub use bing::BingBackend;
pub use brave::BraveBackend;
pub use duckduckgo::DuckDuckGoBackend;

/// Build every bundled backend, sharing `governor`.
pub fn default_backends(
    http: &HttpConfig,
    governor: &Arc<ThrottleGovernor>,
) -> Vec<Arc<dyn SearchBackend>> {
    vec![
        Arc::new(BingBackend::new(http.clone(), Arc::clone(governor))),
        Arc::new(BraveBackend::new(http.clone(), Arc::clone(governor))),
        Arc::new(DuckDuckGoBackend::new(http.clone(), Arc::clone(governor))),
    ]
}

/// CSS selectors locating the parts of one organic result.
///
/// `title`, `link` and `description` are matched inside each `container`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResultLayout {
    pub container: &'static str,
    pub title: &'static str,
    pub link: &'static str,
    pub description: &'static str,
}

fn selector(css: &str) -> Result<Selector, BackendError> {
    Selector::parse(css).map_err(|e| BackendError::Parse(format!("invalid selector {css:?}: {e:?}")))
}

/// Extract up to `limit` results from an engine's HTML.
///
/// Containers without a title or a resolvable link are skipped. `resolve`
/// turns a raw `href` into the target URL, or rejects it.
pub(crate) fn parse_results(
    html: &str,
    layout: ResultLayout,
    engine: &str,
    limit: usize,
    resolve: impl Fn(&str) -> Option<String>,
) -> Result<Vec<SearchResult>, BackendError> {
    let document = Html::parse_document(html);
    let container_sel = selector(layout.container)?;
    let title_sel = selector(layout.title)?;
    let link_sel = selector(layout.link)?;
    let description_sel = selector(layout.description)?;

    let mut results = Vec::new();

    for element in document.select(&container_sel) {
        if results.len() >= limit {
            break;
        }

        let Some(title) = element
            .select(&title_sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
        else {
            continue;
        };

        let Some(url) = element
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(&resolve)
        else {
            continue;
        };

        let description = element
            .select(&description_sel)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default();

        results.push(SearchResult {
            title,
            source: source_of(&url),
            url,
            description,
            engine: engine.to_owned(),
        });
    }

    tracing::debug!(engine, count = results.len(), "results parsed");
    Ok(results)
}

/// Accept only absolute http(s) links.
pub(crate) fn absolute_http(href: &str) -> Option<String> {
    let href = href.trim();
    (href.starts_with("https://") || href.starts_with("http://")).then(|| href.to_owned())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
