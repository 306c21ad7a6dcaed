use std::path::PathBuf;

use pricelens_scraper::TransportError;
use thiserror::Error;

/// The only failure a resolve call surfaces to its caller.
#[derive(Debug, Error)]
pub enum AccuracyError {
    #[error("no product record obtainable for {url}: curated lookup missed and live fetch failed")]
    AllSourcesExhausted {
        url: String,
        #[source]
        source: TransportError,
    },
}

/// Failure of one alternative-source lookup step. Logged and skipped by the
/// fallback chain, never surfaced.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{provider} has no record for {url}")]
    NotFound { provider: String, url: String },

    #[error("{provider} is unavailable: {reason}")]
    Unavailable { provider: String, reason: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("metrics file I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metrics file {} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
