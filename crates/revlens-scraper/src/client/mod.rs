//! HTTP client for marketplace HTML pages.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// Body fragments that only appear on the marketplace's robot-check page.
pub(crate) const CHALLENGE_MARKERS: &[&str] = &[
    "/errors/validateCaptcha",
    "Enter the characters you see below",
    "Type the characters you see in this image",
];

/// Connection and retry settings for [`PageClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Extra attempts after the first failure, for network errors only.
    pub max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    pub backoff_base_secs: u64,
}

/// Fetches marketplace pages with a browser-like header set.
///
/// HTTP 503 and challenge-page bodies surface as [`ScraperError::Blocked`]
/// and are never retried. Network failures are retried with exponential
/// backoff up to `max_retries` additional attempts.
#[derive(Debug, Clone)]
pub struct PageClient {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl PageClient {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config or user agent).
    pub fn new(settings: &ClientSettings) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .default_headers(browser_headers())
            .build()?;
        Ok(Self {
            client,
            max_retries: settings.max_retries,
            backoff_base_secs: settings.backoff_base_secs,
        })
    }

    /// Fetches `url` and returns the HTML body.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Blocked`]: HTTP 503 or a challenge-page body (not retried).
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status (not retried).
    /// - [`ScraperError::Http`]: network or TLS failure after all retries.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            let response = self.client.get(url).send().await?;
            let status = response.status();

            if status == StatusCode::SERVICE_UNAVAILABLE {
                return Err(ScraperError::Blocked {
                    url: url.to_owned(),
                    reason: "HTTP 503".to_owned(),
                });
            }

            if !status.is_success() {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }

            let body = response.text().await?;
            if let Some(marker) = challenge_marker(&body) {
                return Err(ScraperError::Blocked {
                    url: url.to_owned(),
                    reason: format!("challenge page marker \"{marker}\""),
                });
            }

            tracing::debug!(url, bytes = body.len(), "fetched page");
            Ok(body)
        })
        .await
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

/// Returns the first challenge marker found in `body`, if any.
pub(crate) fn challenge_marker(body: &str) -> Option<&'static str> {
    CHALLENGE_MARKERS
        .iter()
        .copied()
        .find(|marker| body.contains(marker))
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
