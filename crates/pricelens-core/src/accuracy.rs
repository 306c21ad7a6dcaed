use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::products::ScrapedProduct;
use crate::validation::{ProductField, ValidationResult};

/// Provenance tag for records served by the curated product database.
pub const SOURCE_CURATED: &str = "curated-database";
/// Provenance tag for records extracted from the live listing page.
pub const SOURCE_LIVE_SCRAPER: &str = "live-scraper";
/// Provenance tag appended when the cross-reference step ran.
pub const SOURCE_CROSS_REFERENCE: &str = "cross-reference";

/// Final output of one resolve call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyEnhancedResult {
    pub product: ScrapedProduct,
    /// Confidence of the final validation pass (0–100).
    pub confidence: u8,
    /// Ordered provenance of every source that contributed. Never empty.
    pub data_sources: Vec<String>,
    pub validation_report: ValidationResult,
    /// Fields a corrector actually overwrote, without duplicates.
    pub corrected_fields: Vec<ProductField>,
    pub timestamp: DateTime<Utc>,
}

/// Running accuracy numbers for one platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub scans: u64,
    pub avg_confidence: f64,
}

/// Process-wide accuracy counters, kept for the lifetime of the session and
/// persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyMetrics {
    pub total_scans: u64,
    pub successful_scans: u64,
    /// Running mean of final confidences across all scans.
    pub average_confidence: f64,
    /// Error message → occurrence count, pruned to the most frequent entries.
    pub common_errors: HashMap<String, u64>,
    pub platform_stats: HashMap<String, PlatformStats>,
    pub last_updated: DateTime<Utc>,
}

impl Default for AccuracyMetrics {
    fn default() -> Self {
        Self {
            total_scans: 0,
            successful_scans: 0,
            average_confidence: 0.0,
            common_errors: HashMap::new(),
            platform_stats: HashMap::new(),
            last_updated: Utc::now(),
        }
    }
}

/// A user's verdict on one field of a resolved product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeedback {
    pub url: String,
    pub is_correct: bool,
    pub expected_value: Option<String>,
    pub actual_value: Option<String>,
    pub field: String,
    pub timestamp: DateTime<Utc>,
    pub user_email: Option<String>,
}

/// One row of the report's per-platform breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformBreakdown {
    pub platform: String,
    pub scans: u64,
    pub avg_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCount {
    pub message: String,
    pub count: u64,
}

/// Aggregate accuracy report derived from [`AccuracyMetrics`] and the
/// feedback log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracyReport {
    pub total_scans: u64,
    pub successful_scans: u64,
    /// `successful_scans / total_scans * 100`; `0.0` before the first scan.
    pub success_rate: f64,
    pub average_confidence: f64,
    pub feedback_count: usize,
    /// Share of feedback entries marking a field incorrect, as a percentage.
    pub correction_rate: f64,
    pub summary: String,
    pub recommendations: Vec<String>,
    pub platform_breakdown: Vec<PlatformBreakdown>,
    pub top_errors: Vec<ErrorCount>,
    pub generated_at: DateTime<Utc>,
}
