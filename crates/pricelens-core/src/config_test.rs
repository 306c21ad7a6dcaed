use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_uses_defaults_when_env_is_empty() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.request_timeout_ms, 15_000);
    assert_eq!(cfg.rate_limit_interval_ms, 2_000);
    assert_eq!(cfg.rate_limit_sweep_ms, 300_000);
    assert_eq!(cfg.max_attempts, 3);
    assert_eq!(cfg.backoff_base_ms, 1_000);
    assert_eq!(cfg.feedback_capacity, 1_000);
    assert_eq!(cfg.record_cache_capacity, 1_000);
    assert_eq!(cfg.cross_reference_threshold, 80);
    assert!(cfg.metrics_path.is_none());
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("PRICELENS_LOG_LEVEL", "debug");
    map.insert("PRICELENS_REQUEST_TIMEOUT_MS", "5000");
    map.insert("PRICELENS_MAX_ATTEMPTS", "5");
    map.insert("PRICELENS_METRICS_PATH", "/tmp/metrics.json");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.log_level, "debug");
    assert_eq!(cfg.request_timeout_ms, 5_000);
    assert_eq!(cfg.max_attempts, 5);
    assert_eq!(
        cfg.metrics_path.as_deref(),
        Some(std::path::Path::new("/tmp/metrics.json"))
    );
}

#[test]
fn build_app_config_rejects_non_numeric_timeout() {
    let mut map = HashMap::new();
    map.insert("PRICELENS_REQUEST_TIMEOUT_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICELENS_REQUEST_TIMEOUT_MS"),
        "expected InvalidEnvVar(PRICELENS_REQUEST_TIMEOUT_MS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_attempts() {
    let mut map = HashMap::new();
    map.insert("PRICELENS_MAX_ATTEMPTS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICELENS_MAX_ATTEMPTS"),
        "expected InvalidEnvVar(PRICELENS_MAX_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_threshold_above_100() {
    let mut map = HashMap::new();
    map.insert("PRICELENS_CROSS_REFERENCE_THRESHOLD", "120");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICELENS_CROSS_REFERENCE_THRESHOLD"),
        "expected InvalidEnvVar(PRICELENS_CROSS_REFERENCE_THRESHOLD), got: {result:?}"
    );
}

#[test]
fn build_app_config_ignores_blank_metrics_path() {
    let mut map = HashMap::new();
    map.insert("PRICELENS_METRICS_PATH", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.metrics_path.is_none());
}

#[test]
fn build_app_config_reads_record_cache_capacity() {
    let mut map = HashMap::new();
    map.insert("PRICELENS_RECORD_CACHE_CAPACITY", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.record_cache_capacity, 250);

    map.insert("PRICELENS_RECORD_CACHE_CAPACITY", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRICELENS_RECORD_CACHE_CAPACITY"),
        "expected InvalidEnvVar(PRICELENS_RECORD_CACHE_CAPACITY), got: {result:?}"
    );
}
