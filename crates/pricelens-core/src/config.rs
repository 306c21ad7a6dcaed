use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load resolver configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function.
///
/// Every variable is optional; unset variables take the [`AppConfig`]
/// defaults.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = AppConfig::default();

    let log_level = lookup("PRICELENS_LOG_LEVEL").unwrap_or(defaults.log_level);
    let request_timeout_ms = parse_number(
        &lookup,
        "PRICELENS_REQUEST_TIMEOUT_MS",
        defaults.request_timeout_ms,
    )?;
    let rate_limit_interval_ms = parse_number(
        &lookup,
        "PRICELENS_RATE_LIMIT_INTERVAL_MS",
        defaults.rate_limit_interval_ms,
    )?;
    let rate_limit_sweep_ms = parse_number(
        &lookup,
        "PRICELENS_RATE_LIMIT_SWEEP_MS",
        defaults.rate_limit_sweep_ms,
    )?;
    let max_attempts = parse_number(&lookup, "PRICELENS_MAX_ATTEMPTS", defaults.max_attempts)?;
    let backoff_base_ms = parse_number(
        &lookup,
        "PRICELENS_BACKOFF_BASE_MS",
        defaults.backoff_base_ms,
    )?;
    let feedback_capacity = parse_number(
        &lookup,
        "PRICELENS_FEEDBACK_CAPACITY",
        defaults.feedback_capacity,
    )?;
    let record_cache_capacity = parse_number(
        &lookup,
        "PRICELENS_RECORD_CACHE_CAPACITY",
        defaults.record_cache_capacity,
    )?;
    let cross_reference_threshold = parse_number(
        &lookup,
        "PRICELENS_CROSS_REFERENCE_THRESHOLD",
        defaults.cross_reference_threshold,
    )?;
    let metrics_path = lookup("PRICELENS_METRICS_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);

    if max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICELENS_MAX_ATTEMPTS".to_owned(),
            reason: "must be at least 1".to_owned(),
        });
    }
    if cross_reference_threshold > 100 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICELENS_CROSS_REFERENCE_THRESHOLD".to_owned(),
            reason: "must be between 0 and 100".to_owned(),
        });
    }

    Ok(AppConfig {
        log_level,
        request_timeout_ms,
        rate_limit_interval_ms,
        rate_limit_sweep_ms,
        max_attempts,
        backoff_base_ms,
        feedback_capacity,
        record_cache_capacity,
        cross_reference_threshold,
        metrics_path,
    })
}

fn parse_number<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_owned(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
