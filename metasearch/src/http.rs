//! Shared HTTP client with User-Agent rotation for the scraping backends.
//!
//! Provides a configured [`reqwest::Client`] with browser-like headers,
//! cookie support, and rotating User-Agent strings to avoid bot detection,
//! plus the mapping from HTTP failures to [`BackendError`].

use crate::config::HttpConfig;
use crate::error::BackendError;
use rand::seq::SliceRandom;
use std::time::Duration;

/// Realistic browser User-Agent strings, rotated per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Build a [`reqwest::Client`] configured for search engine scraping.
///
/// The client has:
/// - Cookie store enabled (for consent interstitials)
/// - Timeout from config
/// - Random User-Agent from built-in rotation list (or custom if configured)
/// - Brotli and gzip decompression
///
/// # Errors
///
/// Returns [`BackendError::Http`] if the client cannot be constructed.
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client, BackendError> {
    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => random_user_agent().to_owned(),
    };

    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| BackendError::Http(format!("failed to build HTTP client: {e}")))
}

/// Send a prepared request and read the body as text.
///
/// HTTP 429 maps to [`BackendError::RateLimited`]; every other transport or
/// status failure maps to [`BackendError::Http`]. `backend` only labels the
/// error message.
pub async fn fetch_text(
    backend: &str,
    request: reqwest::RequestBuilder,
) -> Result<String, BackendError> {
    let response = request
        .send()
        .await
        .map_err(|e| BackendError::Http(format!("{backend} request failed: {e}")))?;

    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(BackendError::RateLimited(format!("{backend} answered HTTP 429")));
    }
    let response = response
        .error_for_status()
        .map_err(|e| BackendError::Http(format!("{backend} HTTP error: {e}")))?;

    let body = response
        .text()
        .await
        .map_err(|e| BackendError::Http(format!("{backend} response read failed: {e}")))?;
    tracing::trace!(backend, bytes = body.len(), "response received");
    Ok(body)
}

/// Host name of `url` without a leading `www.`, or an empty string.
pub fn source_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_owned()))
        .unwrap_or_default()
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        // USER_AGENTS is non-empty.
        .unwrap_or(USER_AGENTS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_user_agent_returns_valid_ua() {
        let ua = random_user_agent();
        assert!(USER_AGENTS.contains(&ua));
        assert!(ua.contains("Mozilla/5.0"));
    }

    #[test]
    fn build_client_with_default_config() {
        let config = HttpConfig::default();
        let client = build_client(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn build_client_with_custom_ua() {
        let config = HttpConfig {
            user_agent: Some("CustomBot/1.0".into()),
            ..Default::default()
        };
        let client = build_client(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn source_is_bare_host() {
        assert_eq!(source_of("https://www.rust-lang.org/learn"), "rust-lang.org");
        assert_eq!(source_of("https://docs.rs/tokio"), "docs.rs");
        assert_eq!(source_of("not a url"), "");
    }

    #[test]
    fn user_agents_list_not_empty() {
        assert!(!USER_AGENTS.is_empty());
        assert_eq!(USER_AGENTS.len(), 5);
    }
}
