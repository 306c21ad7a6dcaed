use thiserror::Error;

/// Failure of a single listing fetch, as surfaced by the network layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Local per-domain cooldown hit, or HTTP 429 from the remote host.
    #[error("rate limited by {domain}")]
    RateLimited {
        domain: String,
        retry_after_ms: Option<u64>,
    },

    /// HTTP 403 or an equivalent bot wall.
    #[error("blocked while fetching {url}")]
    Blocked { url: String },

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    /// Any other failure. `status` is `None` for connection-level errors.
    #[error("HTTP error fetching {url}: {reason}")]
    Http {
        url: String,
        status: Option<u16>,
        reason: String,
    },
}

impl TransportError {
    /// Returns `true` when another attempt may succeed.
    ///
    /// Client errors other than 403/429 are permanent: retrying a 404 returns
    /// the same 404.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            TransportError::RateLimited { .. }
            | TransportError::Blocked { .. }
            | TransportError::Timeout { .. } => true,
            TransportError::Http { status, .. } => status.is_none_or(|s| s >= 500),
        }
    }

    /// Short machine-friendly tag, used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::RateLimited { .. } => "rate_limited",
            TransportError::Blocked { .. } => "blocked",
            TransportError::Timeout { .. } => "timeout",
            TransportError::Http { .. } => "http_error",
        }
    }
}
