//! Durable storage for accuracy metrics and the feedback log.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use pricelens_core::{AccuracyMetrics, UserFeedback};

use crate::error::StoreError;

/// Everything the monitor persists between sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub metrics: AccuracyMetrics,
    /// Oldest first.
    pub feedback: Vec<UserFeedback>,
}

pub trait MetricsStore: Send + Sync {
    /// Returns `Ok(None)` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if stored data exists but cannot be read.
    fn load(&self) -> Result<Option<MetricsSnapshot>, StoreError>;

    /// # Errors
    ///
    /// Returns [`StoreError`] if the snapshot cannot be written.
    fn save(&self, snapshot: &MetricsSnapshot) -> Result<(), StoreError>;
}

/// Pretty-printed JSON file. Saves go through a sibling temp file and a
/// rename, so a crash mid-write leaves the previous snapshot intact.
///
/// Clones share one write lock. The temp file name carries the process id,
/// so stores in different processes never write the same temp file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension(format!("json.{}.tmp", std::process::id()))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl MetricsStore for JsonFileStore {
    fn load(&self) -> Result<Option<MetricsSnapshot>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Json {
                path: self.path.clone(),
                source,
            })
    }

    fn save(&self, snapshot: &MetricsSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(snapshot).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), "metrics snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("metrics.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/metrics.json"));

        let mut snapshot = MetricsSnapshot::default();
        snapshot.metrics.total_scans = 4;
        snapshot.metrics.average_confidence = 72.5;
        snapshot.feedback.push(UserFeedback {
            url: "https://www.etsy.com/listing/1".to_owned(),
            is_correct: false,
            expected_value: Some("$19.95".to_owned()),
            actual_value: Some("$0.00".to_owned()),
            field: "price".to_owned(),
            timestamp: Utc::now(),
            user_email: None,
        });
        store.save(&snapshot).unwrap();

        assert_eq!(store.load().unwrap(), Some(snapshot));
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn concurrent_saves_leave_a_complete_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("metrics.json"));

        std::thread::scope(|scope| {
            for n in 1..=8u64 {
                let store = store.clone();
                scope.spawn(move || {
                    let mut snapshot = MetricsSnapshot::default();
                    snapshot.metrics.total_scans = n;
                    store.save(&snapshot).unwrap();
                });
            }
        });

        let loaded = store.load().unwrap().unwrap();
        assert!((1..=8).contains(&loaded.metrics.total_scans));
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("metrics.json")]);
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.json");
        fs::write(&path, "{not json").unwrap();
        let err = JsonFileStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }
}
