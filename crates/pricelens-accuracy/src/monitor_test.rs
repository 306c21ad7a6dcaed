use chrono::Utc;
use proptest::prelude::*;

use pricelens_core::{
    AccuracyEnhancedResult, Platform, ProductField, ScrapedProduct, Severity, ValidationIssue,
    ValidationResult,
};

use super::*;
use crate::error::StoreError;
use crate::store::JsonFileStore;

fn scan(confidence: u8, high_issues: &[&str]) -> AccuracyEnhancedResult {
    let issues = high_issues
        .iter()
        .map(|m| ValidationIssue::new(ProductField::Price, Severity::High, *m, "$0.00"))
        .collect();
    let mut report = ValidationResult::from_issues(issues, vec![]);
    report.confidence = confidence;
    report.is_valid = confidence >= 70;
    AccuracyEnhancedResult {
        product: ScrapedProduct::placeholder(Platform::Etsy),
        confidence,
        data_sources: vec!["live-scraper".to_owned()],
        validation_report: report,
        corrected_fields: vec![],
        timestamp: Utc::now(),
    }
}

fn feedback(field: &str, is_correct: bool) -> UserFeedback {
    UserFeedback {
        url: "https://www.etsy.com/listing/1".to_owned(),
        is_correct,
        expected_value: None,
        actual_value: None,
        field: field.to_owned(),
        timestamp: Utc::now(),
        user_email: None,
    }
}

#[test]
fn scans_update_totals_and_platform_stats() {
    let monitor = AccuracyMonitor::default();
    monitor.record_scan_result(&scan(90, &[]), "https://www.etsy.com/listing/1");
    monitor.record_scan_result(&scan(50, &[]), "https://www.etsy.com/listing/2");
    monitor.record_scan_result(&scan(70, &[]), "https://www.amazon.com/dp/B0BDHWDR12");

    let metrics = monitor.metrics();
    assert_eq!(metrics.total_scans, 3);
    assert_eq!(metrics.successful_scans, 2);
    assert!((metrics.average_confidence - 70.0).abs() < 1e-9);

    let etsy = &metrics.platform_stats["etsy"];
    assert_eq!(etsy.scans, 2);
    assert!((etsy.avg_confidence - 70.0).abs() < 1e-9);
    assert_eq!(metrics.platform_stats["amazon"].scans, 1);
}

#[test]
fn high_severity_messages_are_counted_and_capped() {
    let monitor = AccuracyMonitor::default();
    for _ in 0..3 {
        monitor.record_scan_result(&scan(40, &["Price is zero"]), "https://www.etsy.com/listing/1");
    }
    for i in 0..15 {
        let message = format!("rare error {i:02}");
        monitor.record_scan_result(&scan(40, &[message.as_str()]), "https://www.etsy.com/listing/1");
    }

    let metrics = monitor.metrics();
    assert_eq!(metrics.common_errors.len(), 10);
    assert_eq!(metrics.common_errors["Price is zero"], 3);
}

#[test]
fn feedback_log_keeps_newest_thousand() {
    let monitor = AccuracyMonitor::default();
    for i in 0..1001 {
        monitor.record_user_feedback(feedback(&format!("field-{i}"), true));
    }
    let log = monitor.feedback();
    assert_eq!(log.len(), 1000);
    assert_eq!(log[0].field, "field-1");
    assert_eq!(log[999].field, "field-1000");
}

#[test]
fn incorrect_feedback_bumps_synthetic_error() {
    let monitor = AccuracyMonitor::default();
    monitor.record_user_feedback(feedback("price", false));
    monitor.record_user_feedback(feedback("price", false));
    monitor.record_user_feedback(feedback("title", true));
    assert_eq!(monitor.metrics().common_errors["User reported incorrect price"], 2);
}

#[test]
fn empty_report_has_no_recommendations() {
    let report = AccuracyMonitor::default().generate_report();
    assert_eq!(report.total_scans, 0);
    assert!(report.success_rate.abs() < f64::EPSILON);
    assert!(report.recommendations.is_empty());
    assert!(report.summary.starts_with("No scans"));
}

#[test]
fn report_triggers_threshold_recommendations() {
    let monitor = AccuracyMonitor::default();
    monitor.record_scan_result(&scan(90, &[]), "https://www.etsy.com/listing/1");
    monitor.record_scan_result(&scan(30, &["Price is zero"]), "https://www.ebay.com/itm/256012345678");
    monitor.record_user_feedback(feedback("price", false));
    monitor.record_user_feedback(feedback("title", true));

    let report = monitor.generate_report();
    assert!((report.success_rate - 50.0).abs() < 1e-9);
    assert!((report.correction_rate - 50.0).abs() < 1e-9);
    assert_eq!(
        report.recommendations,
        vec![
            RECOMMEND_EXTRACTION.to_owned(),
            RECOMMEND_SOURCES.to_owned(),
            RECOMMEND_FEEDBACK.to_owned(),
        ]
    );
    assert_eq!(report.feedback_count, 2);
    assert_eq!(report.platform_breakdown.len(), 2);
    assert_eq!(report.top_errors[0].message, "Price is zero");
}

#[test]
fn report_keeps_top_five_errors() {
    let monitor = AccuracyMonitor::default();
    for i in 0..8u8 {
        let message = format!("error {i}");
        for _ in 0..=i {
            monitor.record_scan_result(&scan(10, &[message.as_str()]), "https://www.etsy.com/listing/1");
        }
    }
    let report = monitor.generate_report();
    let messages: Vec<&str> = report.top_errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, ["error 7", "error 6", "error 5", "error 4", "error 3"]);
}

#[test]
fn platform_breakdown_is_sorted_by_scans() {
    let monitor = AccuracyMonitor::default();
    monitor.record_scan_result(&scan(80, &[]), "https://www.amazon.com/dp/B0BDHWDR12");
    monitor.record_scan_result(&scan(80, &[]), "https://www.etsy.com/listing/1");
    monitor.record_scan_result(&scan(80, &[]), "https://www.etsy.com/listing/2");

    let report = monitor.generate_report();
    assert_eq!(report.platform_breakdown[0].platform, "etsy");
    assert_eq!(report.platform_breakdown[1].platform, "amazon");
}

#[test]
fn persisted_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn MetricsStore> = Arc::new(JsonFileStore::new(dir.path().join("metrics.json")));

    let first = AccuracyMonitor::with_store(1000, Arc::clone(&store));
    first.record_scan_result(&scan(85, &[]), "https://www.etsy.com/listing/1");
    first.record_user_feedback(feedback("seller", false));
    drop(first);

    let second = AccuracyMonitor::with_store(1000, store);
    assert_eq!(second.metrics().total_scans, 1);
    assert_eq!(second.feedback().len(), 1);
}

#[test]
fn unreadable_store_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metrics.json");
    std::fs::write(&path, "garbage").unwrap();

    let monitor = AccuracyMonitor::with_store(1000, Arc::new(JsonFileStore::new(&path)));
    assert_eq!(monitor.metrics().total_scans, 0);
}

/// Records the `total_scans` of every saved snapshot, slowly enough that
/// unordered saves would interleave.
#[derive(Default)]
struct RecordingStore {
    saved: Mutex<Vec<u64>>,
}

impl MetricsStore for RecordingStore {
    fn load(&self) -> Result<Option<MetricsSnapshot>, StoreError> {
        Ok(None)
    }

    fn save(&self, snapshot: &MetricsSnapshot) -> Result<(), StoreError> {
        std::thread::sleep(std::time::Duration::from_millis(1));
        self.saved.lock().unwrap().push(snapshot.metrics.total_scans);
        Ok(())
    }
}

#[test]
fn concurrent_scans_are_saved_in_order() {
    let store = Arc::new(RecordingStore::default());
    let monitor = AccuracyMonitor::with_store(1000, Arc::clone(&store) as Arc<dyn MetricsStore>);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..10 {
                    monitor.record_scan_result(&scan(80, &[]), "https://www.etsy.com/listing/1");
                }
            });
        }
    });

    let saved = store.saved.lock().unwrap().clone();
    assert_eq!(saved, (1..=80).collect::<Vec<u64>>());
}

#[test]
fn last_saved_file_matches_final_state() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn MetricsStore> = Arc::new(JsonFileStore::new(dir.path().join("metrics.json")));
    let monitor = AccuracyMonitor::with_store(1000, Arc::clone(&store));

    std::thread::scope(|scope| {
        for n in 0..4 {
            let monitor = &monitor;
            scope.spawn(move || {
                for _ in 0..5 {
                    monitor.record_scan_result(&scan(90, &[]), "https://www.etsy.com/listing/1");
                }
                monitor.record_user_feedback(feedback(&format!("field{n}"), true));
            });
        }
    });

    let on_disk = store.load().unwrap().unwrap();
    assert_eq!(on_disk.metrics.total_scans, 20);
    assert_eq!(on_disk.feedback.len(), 4);
    assert_eq!(on_disk.metrics, monitor.metrics());
}

proptest! {
    #[test]
    fn average_confidence_is_the_mean(confidences in prop::collection::vec(0u8..=100, 1..60)) {
        let monitor = AccuracyMonitor::default();
        for c in &confidences {
            monitor.record_scan_result(&scan(*c, &[]), "https://www.walmart.com/ip/x/1");
        }
        let sum: f64 = confidences.iter().map(|c| f64::from(*c)).sum();
        #[allow(clippy::cast_precision_loss)]
        let mean = sum / confidences.len() as f64;

        let metrics = monitor.metrics();
        prop_assert!((metrics.average_confidence - mean).abs() < 1e-9);
        prop_assert!((metrics.platform_stats["walmart"].avg_confidence - mean).abs() < 1e-9);
        prop_assert_eq!(metrics.total_scans, confidences.len() as u64);
    }
}
