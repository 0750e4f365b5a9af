use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{history_db_path, MAX_RESULTS, PROBE_KEY, STORAGE_KEY};
use crate::db::{MemoryStorage, SqliteStorage, StorageBackend};
use crate::models::{StorageMode, TestResult, TestStats};
use crate::pipeline::analysis::classify;

use super::HistoryError;

/// Persistent, size-capped list of [`TestResult`]s.
///
/// Whether the persistent medium is usable is decided once, in the
/// constructors. After that the backend never changes: a store that opened
/// persistent stays persistent and surfaces write errors to the caller.
pub struct ResultStore {
    backend: Box<dyn StorageBackend>,
    mode: StorageMode,
    max_results: usize,
}

impl ResultStore {
    /// Wrap `backend` after a write/remove probe. A backend that fails the
    /// probe is replaced by a transient in-memory one.
    pub fn open(backend: Box<dyn StorageBackend>) -> Self {
        match probe(backend.as_ref()) {
            Ok(()) => {
                debug!(backend = %backend.describe(), "History storage available");
                Self::with_backend(backend, StorageMode::Persistent)
            }
            Err(e) => {
                warn!(
                    backend = %backend.describe(),
                    error = %e,
                    "History storage unavailable, falling back to memory"
                );
                Self::memory_fallback()
            }
        }
    }

    /// Open the SQLite history inside `data_dir`, falling back to memory when
    /// the database cannot be opened.
    pub fn open_at(data_dir: &Path) -> Self {
        let path = history_db_path(data_dir);
        match SqliteStorage::open(&path) {
            Ok(storage) => Self::open(Box::new(storage)),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Cannot open history database, falling back to memory"
                );
                Self::memory_fallback()
            }
        }
    }

    /// Transient store, by choice rather than by fallback.
    pub fn in_memory() -> Self {
        Self::with_backend(Box::new(MemoryStorage::new()), StorageMode::Memory)
    }

    /// Transient store used when no persistent storage could be set up.
    pub fn memory_fallback() -> Self {
        Self::with_backend(Box::new(MemoryStorage::new()), StorageMode::MemoryFallback)
    }

    fn with_backend(backend: Box<dyn StorageBackend>, mode: StorageMode) -> Self {
        Self {
            backend,
            mode,
            max_results: MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    // ═══════════════════════════════════════════════════════════
    // Operations
    // ═══════════════════════════════════════════════════════════

    /// Insert `result` at the front, or replace the record with the same id
    /// in place. The oldest insertions past the cap are dropped.
    pub fn save(&self, result: TestResult) -> Result<(), HistoryError> {
        validate_result(&result)?;

        let mut results = self.read_all()?;
        let replaced = match results.iter().position(|r| r.id == result.id) {
            Some(index) => {
                results[index] = result.clone();
                true
            }
            None => {
                results.insert(0, result.clone());
                false
            }
        };
        results.truncate(self.max_results);
        self.write_all(&results)?;

        info!(
            id = %result.id,
            value = result.cholesterol_value,
            replaced,
            stored = results.len(),
            "Test result saved"
        );
        Ok(())
    }

    /// All results, newest first.
    pub fn list(&self) -> Result<Vec<TestResult>, HistoryError> {
        let mut results = self.read_all()?;
        sort_newest_first(&mut results);
        Ok(results)
    }

    pub fn get(&self, id: &str) -> Result<Option<TestResult>, HistoryError> {
        Ok(self.read_all()?.into_iter().find(|r| r.id == id))
    }

    /// Remove one result. Returns `false` when no result has that id.
    pub fn delete(&self, id: &str) -> Result<bool, HistoryError> {
        if id.trim().is_empty() {
            return Err(HistoryError::InvalidId);
        }
        let removed = self.remove_where(|r| r.id == id)?;
        if removed > 0 {
            info!(id, "Test result deleted");
        }
        Ok(removed > 0)
    }

    /// Remove every result matching `predicate`. Returns how many went.
    pub fn remove_where<F>(&self, predicate: F) -> Result<usize, HistoryError>
    where
        F: Fn(&TestResult) -> bool,
    {
        let mut results = self.read_all()?;
        let before = results.len();
        results.retain(|r| !predicate(r));
        let removed = before - results.len();
        if removed > 0 {
            self.write_all(&results)?;
        }
        Ok(removed)
    }

    pub fn clear(&self) -> Result<(), HistoryError> {
        self.backend.remove(STORAGE_KEY)?;
        info!("History cleared");
        Ok(())
    }

    pub fn stats(&self) -> Result<TestStats, HistoryError> {
        let results = self.list()?;
        let Some(latest) = results.first() else {
            return Ok(TestStats::empty());
        };

        let total: u64 = results.iter().map(|r| u64::from(r.cholesterol_value)).sum();
        let average = (total as f64 / results.len() as f64).round() as u32;

        Ok(TestStats {
            total_tests: results.len(),
            last_test: latest.recorded_at(),
            average_value: average,
        })
    }

    /// Pretty-printed JSON array of the history, newest first.
    pub fn export_json(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string_pretty(&self.list()?)?)
    }

    /// Merge a JSON array of results into the history. Invalid elements and
    /// ids already present are skipped. Returns how many were added.
    pub fn import_json(&self, json: &str) -> Result<usize, HistoryError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| HistoryError::InvalidImport(format!("not valid JSON: {e}")))?;
        let Value::Array(items) = value else {
            return Err(HistoryError::InvalidImport(
                "expected a JSON array of test results".into(),
            ));
        };

        let total = items.len();
        let incoming = valid_results(items);
        if incoming.len() < total {
            warn!(
                skipped = total - incoming.len(),
                "Skipped invalid records during import"
            );
        }
        self.merge(incoming)
    }

    /// Add `incoming` records whose ids are not stored yet, then re-sort and
    /// re-apply the cap. Returns how many were added.
    pub fn merge(&self, incoming: Vec<TestResult>) -> Result<usize, HistoryError> {
        let mut results = self.read_all()?;
        let mut seen: HashSet<String> = results.iter().map(|r| r.id.clone()).collect();

        let mut added = 0;
        for result in incoming {
            if validate_result(&result).is_err() {
                continue;
            }
            if seen.insert(result.id.clone()) {
                results.push(result);
                added += 1;
            }
        }

        if added > 0 {
            sort_newest_first(&mut results);
            results.truncate(self.max_results);
            self.write_all(&results)?;
        }

        info!(added, stored = results.len(), "Test results merged");
        Ok(added)
    }

    // ═══════════════════════════════════════════════════════════
    // Payload
    // ═══════════════════════════════════════════════════════════

    /// Stored results in insertion order. A payload that is not a JSON array
    /// is discarded; elements that are not valid results are skipped.
    fn read_all(&self) -> Result<Vec<TestResult>, HistoryError> {
        let Some(raw) = self.backend.get(STORAGE_KEY)? else {
            return Ok(Vec::new());
        };

        let items = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            _ => {
                warn!(key = STORAGE_KEY, "Corrupt history payload, resetting");
                if let Err(e) = self.backend.remove(STORAGE_KEY) {
                    warn!(error = %e, "Failed to remove corrupt history payload");
                }
                return Ok(Vec::new());
            }
        };

        let total = items.len();
        let results = valid_results(items);
        if results.len() < total {
            warn!(dropped = total - results.len(), "Dropped invalid stored records");
        }
        Ok(results)
    }

    fn write_all(&self, results: &[TestResult]) -> Result<(), HistoryError> {
        let payload = serde_json::to_string(results)?;
        self.backend.set(STORAGE_KEY, &payload)?;
        Ok(())
    }
}

fn probe(backend: &dyn StorageBackend) -> Result<(), crate::db::DatabaseError> {
    backend.set(PROBE_KEY, PROBE_KEY)?;
    backend.remove(PROBE_KEY)
}

fn sort_newest_first(results: &mut [TestResult]) {
    results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

fn valid_results(items: Vec<Value>) -> Vec<TestResult> {
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<TestResult>(item).ok())
        .filter(|r| validate_result(r).is_ok())
        .collect()
}

/// Field and range checks applied before anything is stored.
pub fn validate_result(result: &TestResult) -> Result<(), HistoryError> {
    if result.id.trim().is_empty() {
        return Err(HistoryError::Validation("id is required".into()));
    }
    if result.timestamp <= 0 {
        return Err(HistoryError::Validation("timestamp is required".into()));
    }
    if result.cholesterol_value == 0 {
        return Err(HistoryError::Validation(
            "cholesterol value must be positive".into(),
        ));
    }
    if !(0.0..=1.0).contains(&result.confidence) {
        return Err(HistoryError::Validation(format!(
            "confidence {} outside [0, 1]",
            result.confidence
        )));
    }
    let expected = classify(result.cholesterol_value);
    if result.classification != expected {
        return Err(HistoryError::Validation(format!(
            "classification '{}' does not match value {} (expected '{}')",
            result.classification, result.cholesterol_value, expected
        )));
    }
    Ok(())
}
