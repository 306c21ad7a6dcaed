//! Process-wide accuracy bookkeeping.
//!
//! [`AccuracyMonitor`] owns the running [`AccuracyMetrics`] and the capped
//! feedback log behind one mutex. Mutators never fail: persistence errors
//! are logged and the in-memory state stays authoritative.
//!
//! Snapshots reach the store in mutation order. A second mutex is held from
//! the state update through the save, so a slow write never lands after a
//! newer one; readers only contend on the state mutex.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use pricelens_core::validation::VALID_CONFIDENCE_THRESHOLD;
use pricelens_core::{
    AccuracyEnhancedResult, AccuracyMetrics, AccuracyReport, ErrorCount, Platform,
    PlatformBreakdown, UserFeedback,
};

use crate::store::{MetricsSnapshot, MetricsStore};

pub const DEFAULT_FEEDBACK_CAPACITY: usize = 1_000;
const MAX_TRACKED_ERRORS: usize = 10;
const REPORT_TOP_ERRORS: usize = 5;

const SUCCESS_RATE_TARGET: f64 = 80.0;
const AVERAGE_CONFIDENCE_TARGET: f64 = 75.0;
const CORRECTION_RATE_LIMIT: f64 = 20.0;

pub const RECOMMEND_EXTRACTION: &str =
    "Success rate is below 80%: review extraction rules for the platforms with the most failures";
pub const RECOMMEND_SOURCES: &str =
    "Average confidence is below 75: extend the curated database or add lookup providers";
pub const RECOMMEND_FEEDBACK: &str =
    "Users flag more than 20% of fields as incorrect: audit the most reported fields";

#[derive(Debug, Default)]
struct MonitorState {
    metrics: AccuracyMetrics,
    feedback: VecDeque<UserFeedback>,
}

impl MonitorState {
    fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            metrics: self.metrics.clone(),
            feedback: self.feedback.iter().cloned().collect(),
        }
    }

    fn bump_error(&mut self, message: &str) {
        *self
            .metrics
            .common_errors
            .entry(message.to_owned())
            .or_insert(0) += 1;
        prune_errors(&mut self.metrics);
    }
}

pub struct AccuracyMonitor {
    state: Mutex<MonitorState>,
    /// Held across mutate-then-save.
    persist_order: Mutex<()>,
    capacity: usize,
    store: Option<Arc<dyn MetricsStore>>,
}

impl std::fmt::Debug for AccuracyMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccuracyMonitor")
            .field("capacity", &self.capacity)
            .field("persistent", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for AccuracyMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_FEEDBACK_CAPACITY)
    }
}

impl AccuracyMonitor {
    /// In-memory monitor keeping at most `capacity` feedback entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(MonitorState::default()),
            persist_order: Mutex::new(()),
            capacity: capacity.max(1),
            store: None,
        }
    }

    /// Monitor backed by `store`, seeded from its last snapshot.
    ///
    /// A snapshot that cannot be read is logged and ignored; the monitor
    /// starts empty and overwrites it on the next save.
    #[must_use]
    pub fn with_store(capacity: usize, store: Arc<dyn MetricsStore>) -> Self {
        let mut state = MonitorState::default();
        match store.load() {
            Ok(Some(snapshot)) => {
                state.metrics = snapshot.metrics;
                state.feedback = snapshot.feedback.into();
                tracing::info!(
                    total_scans = state.metrics.total_scans,
                    feedback = state.feedback.len(),
                    "loaded persisted accuracy metrics"
                );
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "ignoring unreadable accuracy metrics"),
        }

        let capacity = capacity.max(1);
        while state.feedback.len() > capacity {
            state.feedback.pop_front();
        }
        Self {
            state: Mutex::new(state),
            persist_order: Mutex::new(()),
            capacity,
            store: Some(store),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MonitorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `mutate` under the state lock, then saves the resulting
    /// snapshot before any later mutation can save its own.
    fn update_and_persist(&self, mutate: impl FnOnce(&mut MonitorState)) {
        let _order = self
            .persist_order
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let snapshot = {
            let mut state = self.lock();
            mutate(&mut state);
            self.store.as_ref().map(|_| state.snapshot())
        };
        if let Some(snapshot) = snapshot {
            self.save(&snapshot);
        }
    }

    fn save(&self, snapshot: &MetricsSnapshot) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(snapshot) {
                tracing::warn!(error = %e, "failed to persist accuracy metrics");
            }
        }
    }

    /// Folds one resolve outcome into the running metrics.
    pub fn record_scan_result(&self, result: &AccuracyEnhancedResult, url: &str) {
        let confidence = f64::from(result.confidence);
        let platform = Platform::from_url(url).as_str().to_owned();

        self.update_and_persist(|state| {
            let metrics = &mut state.metrics;

            metrics.total_scans += 1;
            if result.confidence >= VALID_CONFIDENCE_THRESHOLD {
                metrics.successful_scans += 1;
            }
            metrics.average_confidence =
                running_mean(metrics.average_confidence, confidence, metrics.total_scans);

            let stats = metrics.platform_stats.entry(platform).or_default();
            stats.scans += 1;
            stats.avg_confidence = running_mean(stats.avg_confidence, confidence, stats.scans);

            for issue in result.validation_report.high_severity_issues() {
                state.bump_error(&issue.message);
            }
            state.metrics.last_updated = Utc::now();
        });
        tracing::debug!(url, confidence = result.confidence, "recorded scan result");
    }

    /// Appends to the feedback log, evicting the oldest entry when full.
    pub fn record_user_feedback(&self, feedback: UserFeedback) {
        self.update_and_persist(|state| {
            if !feedback.is_correct {
                state.bump_error(&format!("User reported incorrect {}", feedback.field));
            }
            tracing::debug!(
                url = %feedback.url,
                field = %feedback.field,
                is_correct = feedback.is_correct,
                "recorded user feedback"
            );
            state.feedback.push_back(feedback);
            while state.feedback.len() > self.capacity {
                state.feedback.pop_front();
            }
            state.metrics.last_updated = Utc::now();
        });
    }

    /// Builds a report from the current metrics and feedback log.
    #[must_use]
    pub fn generate_report(&self) -> AccuracyReport {
        let state = self.lock();
        let metrics = &state.metrics;

        let success_rate = percentage(metrics.successful_scans, metrics.total_scans);
        let incorrect = state.feedback.iter().filter(|f| !f.is_correct).count();
        let correction_rate = percentage(incorrect as u64, state.feedback.len() as u64);

        let mut recommendations = Vec::new();
        if metrics.total_scans > 0 {
            if success_rate < SUCCESS_RATE_TARGET {
                recommendations.push(RECOMMEND_EXTRACTION.to_owned());
            }
            if metrics.average_confidence < AVERAGE_CONFIDENCE_TARGET {
                recommendations.push(RECOMMEND_SOURCES.to_owned());
            }
        }
        if !state.feedback.is_empty() && correction_rate > CORRECTION_RATE_LIMIT {
            recommendations.push(RECOMMEND_FEEDBACK.to_owned());
        }

        let mut platform_breakdown: Vec<PlatformBreakdown> = metrics
            .platform_stats
            .iter()
            .map(|(platform, stats)| PlatformBreakdown {
                platform: platform.clone(),
                scans: stats.scans,
                avg_confidence: stats.avg_confidence,
            })
            .collect();
        platform_breakdown.sort_by(|a, b| b.scans.cmp(&a.scans).then_with(|| a.platform.cmp(&b.platform)));

        let mut top_errors = ranked_errors(metrics);
        top_errors.truncate(REPORT_TOP_ERRORS);

        AccuracyReport {
            total_scans: metrics.total_scans,
            successful_scans: metrics.successful_scans,
            success_rate,
            average_confidence: metrics.average_confidence,
            feedback_count: state.feedback.len(),
            correction_rate,
            summary: summary(metrics, success_rate, state.feedback.len()),
            recommendations,
            platform_breakdown,
            top_errors,
            generated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn metrics(&self) -> AccuracyMetrics {
        self.lock().metrics.clone()
    }

    /// Feedback log, oldest first.
    #[must_use]
    pub fn feedback(&self) -> Vec<UserFeedback> {
        self.lock().feedback.iter().cloned().collect()
    }

    /// Writes the current state to the store, if any.
    pub fn flush(&self) {
        self.update_and_persist(|_| {});
    }
}

/// `avg' = avg + (x - avg) / n`, where `n` already counts `x`.
#[allow(clippy::cast_precision_loss)]
fn running_mean(avg: f64, x: f64, n: u64) -> f64 {
    avg + (x - avg) / n as f64
}

#[allow(clippy::cast_precision_loss)]
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Errors by count descending, ties broken by message.
fn ranked_errors(metrics: &AccuracyMetrics) -> Vec<ErrorCount> {
    let mut ranked: Vec<ErrorCount> = metrics
        .common_errors
        .iter()
        .map(|(message, count)| ErrorCount {
            message: message.clone(),
            count: *count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.message.cmp(&b.message)));
    ranked
}

fn prune_errors(metrics: &mut AccuracyMetrics) {
    if metrics.common_errors.len() <= MAX_TRACKED_ERRORS {
        return;
    }
    let mut ranked = ranked_errors(metrics);
    ranked.truncate(MAX_TRACKED_ERRORS);
    metrics.common_errors = ranked.into_iter().map(|e| (e.message, e.count)).collect();
}

fn summary(metrics: &AccuracyMetrics, success_rate: f64, feedback: usize) -> String {
    if metrics.total_scans == 0 {
        return format!("No scans recorded yet; {feedback} feedback entries on file.");
    }
    format!(
        "{} of {} scans met the confidence threshold ({success_rate:.1}%), average confidence {:.1}; {feedback} feedback entries on file.",
        metrics.successful_scans, metrics.total_scans, metrics.average_confidence,
    )
}

#[cfg(test)]
#[path = "monitor_test.rs"]
mod tests;
