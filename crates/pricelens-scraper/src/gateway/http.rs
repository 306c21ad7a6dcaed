//! `reqwest`-backed [`HtmlFetcher`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use pricelens_core::extract_host;

use super::HtmlFetcher;
use crate::error::TransportError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches listing pages over HTTP(S).
///
/// Status mapping: 429 → [`TransportError::RateLimited`] (honouring a numeric
/// `Retry-After`), 403 → [`TransportError::Blocked`], client timeouts →
/// [`TransportError::Timeout`], any other non-2xx or connection failure →
/// [`TransportError::Http`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Http {
                url: String::new(),
                status: None,
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn map_send_error(url: &str, err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_owned(),
        }
    } else {
        TransportError::Http {
            url: url.to_owned(),
            status: err.status().map(|s| s.as_u16()),
            reason: err.to_string(),
        }
    }
}

#[async_trait]
impl HtmlFetcher for HttpFetcher {
    async fn fetch_html(
        &self,
        url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .header(reqwest::header::USER_AGENT, user_agent)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| map_send_error(url, &e))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000));
            return Err(TransportError::RateLimited {
                domain: extract_host(url),
                retry_after_ms,
            });
        }

        if status == StatusCode::FORBIDDEN {
            return Err(TransportError::Blocked {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(TransportError::Http {
                url: url.to_owned(),
                status: Some(status.as_u16()),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_owned(),
            });
        }

        response.text().await.map_err(|e| map_send_error(url, &e))
    }
}
