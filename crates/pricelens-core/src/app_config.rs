use std::path::PathBuf;

/// Runtime configuration for the resolver pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: String,
    /// Per-fetch timeout handed to the network collaborator.
    pub request_timeout_ms: u64,
    /// Minimum gap between two requests to the same domain.
    pub rate_limit_interval_ms: u64,
    /// Interval at which the per-domain request map is cleared.
    pub rate_limit_sweep_ms: u64,
    /// Total fetch attempts, including the first.
    pub max_attempts: u32,
    /// Base delay for exponential backoff: `backoff_base_ms * 2^attempt`.
    pub backoff_base_ms: u64,
    pub feedback_capacity: usize,
    /// Listings kept in the record cache before the oldest is evicted.
    pub record_cache_capacity: usize,
    /// Confidence below which the cross-reference step runs.
    pub cross_reference_threshold: u8,
    /// JSON file used to persist accuracy metrics; in-memory only when `None`.
    pub metrics_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            request_timeout_ms: 15_000,
            rate_limit_interval_ms: 2_000,
            rate_limit_sweep_ms: 300_000,
            max_attempts: 3,
            backoff_base_ms: 1_000,
            feedback_capacity: 1_000,
            record_cache_capacity: 1_000,
            cross_reference_threshold: 80,
            metrics_path: None,
        }
    }
}
