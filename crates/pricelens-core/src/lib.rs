//! Shared data model and configuration for the pricelens resolver.

pub mod accuracy;
pub mod app_config;
pub mod config;
pub mod platform;
pub mod price;
pub mod products;
pub mod validation;

use thiserror::Error;

pub use accuracy::{
    AccuracyEnhancedResult, AccuracyMetrics, AccuracyReport, ErrorCount, PlatformBreakdown,
    PlatformStats, UserFeedback, SOURCE_CROSS_REFERENCE, SOURCE_CURATED, SOURCE_LIVE_SCRAPER,
};
pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use platform::{extract_host, extract_path, Platform};
pub use products::{is_generic_title, Availability, ProductRecord, ScrapedProduct};
pub use validation::{ProductField, Severity, ValidationIssue, ValidationResult};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
