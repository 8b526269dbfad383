//! The observation log store.
//!
//! The whole log lives as one JSON array under a single key. Appends are a
//! read-modify-write of that blob, serialized by a lock shared between clones
//! of the same [`ObservationLog`]. Independently constructed logs over the same
//! storage, or other processes, are not coordinated and can lose updates.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::kv::KeyValueStore;
use crate::record::ObservationRecord;

/// Storage key used by the original mobile journal.
pub const DEFAULT_LOG_KEY: &str = "droneLogs";

/// Durable, insertion-ordered list of observation records.
#[derive(Debug)]
pub struct ObservationLog<S> {
    store: Arc<S>,
    key: String,
    write_lock: Arc<Mutex<()>>,
}

impl<S> Clone for ObservationLog<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<S: KeyValueStore> ObservationLog<S> {
    /// Create a log under [`DEFAULT_LOG_KEY`].
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_LOG_KEY)
    }

    /// Create a log under a custom storage key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store: Arc::new(store),
            key: key.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The storage key holding the blob.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying key-value store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load every record, oldest first.
    ///
    /// A missing key is an empty log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptData`] if the blob is not a JSON array of
    /// records, or a persistence error if the read fails.
    pub async fn load_all(&self) -> Result<Vec<ObservationRecord>> {
        let Some(blob) = self.store.get(&self.key).await? else {
            debug!(key = %self.key, "No observations stored");
            return Ok(Vec::new());
        };

        let records: Vec<ObservationRecord> =
            serde_json::from_str(&blob).map_err(|source| {
                warn!(key = %self.key, error = %source, "Stored observations are corrupt");
                Error::CorruptData {
                    key: self.key.clone(),
                    source,
                }
            })?;

        debug!(key = %self.key, count = records.len(), "Loaded observations");
        Ok(records)
    }

    /// Append one record to the end of the log.
    ///
    /// The write happens only after the existing log loads and the new log
    /// serializes, so a failure at any step leaves the stored log untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLocation`] if the record's coordinates are out
    /// of range or not finite, [`Error::CorruptData`] if the existing blob
    /// cannot be parsed, or a persistence error if the read or write fails.
    pub async fn append(&self, record: ObservationRecord) -> Result<()> {
        // JSON has no NaN or infinity; serde_json would write them as null.
        if let Some(location) = record.location.filter(|l| !l.is_valid()) {
            warn!(key = %self.key, id = %record.id, %location, "Rejected invalid location");
            return Err(Error::InvalidLocation {
                latitude: location.latitude,
                longitude: location.longitude,
            });
        }

        let _guard = self.write_lock.lock().await;

        let mut records = self.load_all().await?;
        let id = record.id.clone();
        records.push(record);

        let blob = serde_json::to_string(&records)?;
        self.store.set(&self.key, &blob).await?;

        info!(key = %self.key, id = %id, count = records.len(), "Appended observation");
        Ok(())
    }

    /// Remove the whole log. Clearing an empty log succeeds.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the delete fails.
    pub async fn clear_all(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        self.store.delete(&self.key).await?;
        info!(key = %self.key, "Cleared all observations");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{MemoryStore, SqliteStore};
    use crate::record::Location;
    use async_trait::async_trait;

    fn create_test_log() -> ObservationLog<MemoryStore> {
        ObservationLog::new(MemoryStore::new())
    }

    fn note(text: &str) -> ObservationRecord {
        ObservationRecord::new(text, None, None)
    }

    /// Suspends between every storage call so interleavings actually happen.
    #[derive(Debug, Default)]
    struct YieldingStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl KeyValueStore for YieldingStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            let value = self.inner.get(key).await;
            tokio::task::yield_now().await;
            value
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            tokio::task::yield_now().await;
            self.inner.set(key, value).await
        }

        async fn delete(&self, key: &str) -> Result<()> {
            tokio::task::yield_now().await;
            self.inner.delete(key).await
        }
    }

    #[tokio::test]
    async fn test_load_all_without_writes_is_empty() {
        let log = create_test_log();
        assert!(log.load_all().await.unwrap().is_empty());
        assert_eq!(log.key(), DEFAULT_LOG_KEY);
    }

    #[tokio::test]
    async fn test_append_then_load_ends_with_record() {
        let log = create_test_log();
        log.append(note("first")).await.unwrap();
        let before = log.load_all().await.unwrap().len();

        let record = note("second");
        log.append(record.clone()).await.unwrap();

        let records = log.load_all().await.unwrap();
        assert_eq!(records.len(), before + 1);
        assert_eq!(records.last(), Some(&record));
    }

    #[tokio::test]
    async fn test_appends_keep_insertion_order() {
        let log = create_test_log();
        let appended: Vec<_> = (0..10).map(|i| note(&format!("entry {i}"))).collect();
        for record in &appended {
            log.append(record.clone()).await.unwrap();
        }

        assert_eq!(log.load_all().await.unwrap(), appended);
    }

    #[tokio::test]
    async fn test_clear_all_empties_log() {
        let log = create_test_log();
        log.append(note("a")).await.unwrap();
        log.append(note("b")).await.unwrap();

        log.clear_all().await.unwrap();
        assert!(log.load_all().await.unwrap().is_empty());
        assert!(log.store().is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_on_empty_log_succeeds() {
        let log = create_test_log();
        log.clear_all().await.unwrap();
        log.clear_all().await.unwrap();
        assert!(log.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bird_sighting_scenario() {
        let log = create_test_log();
        let a = ObservationRecord::new("Bird sighting", None, None);
        let b = ObservationRecord::new(
            "",
            Some("file://x.jpg".to_string()),
            Some(Location::new(55.6761, 12.5683)),
        );

        log.append(a.clone()).await.unwrap();
        log.append(b.clone()).await.unwrap();

        let records = log.load_all().await.unwrap();
        assert_eq!(records, vec![a, b]);
        assert_eq!(records[1].description, "");
    }

    #[tokio::test]
    async fn test_concurrent_appends_both_persist() {
        let log = ObservationLog::new(YieldingStore::default());
        let other = log.clone();
        let a = note("left");
        let b = note("right");

        let (first, second) = tokio::join!(log.append(a.clone()), other.append(b.clone()));
        first.unwrap();
        second.unwrap();

        let records = log.load_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.contains(&a));
        assert!(records.contains(&b));
    }

    #[tokio::test]
    async fn test_independent_logs_can_lose_updates() {
        let store = Arc::new(YieldingStore::default());
        let left = ObservationLog::new(Arc::clone(&store));
        let right = ObservationLog::new(Arc::clone(&store));

        let (first, second) = tokio::join!(left.append(note("left")), right.append(note("right")));
        first.unwrap();
        second.unwrap();

        // Both read the empty log before either wrote, so the last write wins.
        assert_eq!(left.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_key_differs_from_corrupt_blob() {
        let store = MemoryStore::new();
        store.set(DEFAULT_LOG_KEY, "{not json").await.unwrap();
        let log = ObservationLog::new(store);

        let err = log.load_all().await.unwrap_err();
        assert!(err.is_corrupt_data());
    }

    #[tokio::test]
    async fn test_non_array_blob_is_corrupt() {
        for blob in ["null", "{}", "\"droneLogs\"", "[{\"id\":1}]", ""] {
            let store = MemoryStore::new();
            store.set(DEFAULT_LOG_KEY, blob).await.unwrap();
            let log = ObservationLog::new(store);
            assert!(
                log.load_all().await.unwrap_err().is_corrupt_data(),
                "blob {blob:?} should be corrupt"
            );
        }
    }

    #[tokio::test]
    async fn test_append_does_not_overwrite_corrupt_blob() {
        let store = MemoryStore::new();
        store.set(DEFAULT_LOG_KEY, "garbage").await.unwrap();
        let log = ObservationLog::new(store);

        assert!(log.append(note("x")).await.unwrap_err().is_corrupt_data());
        assert_eq!(
            log.store().get(DEFAULT_LOG_KEY).await.unwrap().as_deref(),
            Some("garbage")
        );
    }

    #[tokio::test]
    async fn test_failed_write_leaves_log_unchanged() {
        let log = create_test_log();
        let kept = note("kept");
        log.append(kept.clone()).await.unwrap();

        log.store().fail_writes(true);
        let err = log.append(note("lost")).await.unwrap_err();
        assert!(matches!(err, Error::PersistenceWrite { .. }));
        assert!(log.clear_all().await.is_err());

        log.store().fail_writes(false);
        assert_eq!(log.load_all().await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn test_append_rejects_non_finite_location() {
        let log = create_test_log();
        let kept = note("kept");
        log.append(kept.clone()).await.unwrap();
        let blob = log.store().get(DEFAULT_LOG_KEY).await.unwrap();

        for location in [
            Location::new(f64::NAN, 12.0),
            Location::new(55.0, f64::INFINITY),
            Location::new(91.0, 0.0),
        ] {
            let record = ObservationRecord::new("bad fix", None, Some(location));
            let err = log.append(record).await.unwrap_err();
            assert!(matches!(err, Error::InvalidLocation { .. }));
        }

        assert_eq!(log.store().get(DEFAULT_LOG_KEY).await.unwrap(), blob);
        assert_eq!(log.load_all().await.unwrap(), vec![kept.clone()]);

        let next = note("still writable");
        log.append(next.clone()).await.unwrap();
        assert_eq!(log.load_all().await.unwrap(), vec![kept, next]);
    }

    #[tokio::test]
    async fn test_failed_read_leaves_log_unchanged() {
        let log = create_test_log();
        let kept = note("kept");
        log.append(kept.clone()).await.unwrap();

        log.store().fail_reads(true);
        let err = log.load_all().await.unwrap_err();
        assert!(matches!(err, Error::PersistenceRead { .. }));
        let err = log.append(note("lost")).await.unwrap_err();
        assert!(matches!(err, Error::PersistenceRead { .. }));

        log.store().fail_reads(false);
        assert_eq!(log.load_all().await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn test_custom_key_is_isolated() {
        let store = MemoryStore::new();
        let default_log = ObservationLog::new(store.clone());
        let custom_log = ObservationLog::with_key(store, "testLogs");

        custom_log.append(note("elsewhere")).await.unwrap();
        assert_eq!(custom_log.key(), "testLogs");
        assert!(default_log.load_all().await.unwrap().is_empty());
        assert_eq!(custom_log.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reads_blob_written_by_mobile_app() {
        let blob = r#"[
            {"id":"1718035200000","timestamp":"2024-06-10T16:00:00.000Z","description":"Bird sighting","imageUri":null,"location":null},
            {"id":"1718035260000","timestamp":"2024-06-10T16:01:00.000Z","description":"","imageUri":"file:///cache/Camera/a.jpg","location":{"accuracy":5,"altitude":12.5,"altitudeAccuracy":3,"heading":0,"latitude":55.6761,"longitude":12.5683,"speed":0}}
        ]"#;
        let store = MemoryStore::new();
        store.set(DEFAULT_LOG_KEY, blob).await.unwrap();
        let log = ObservationLog::new(store);

        let records = log.load_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "Bird sighting");
        assert_eq!(records[1].location, Some(Location::new(55.6761, 12.5683)));
    }

    #[tokio::test]
    async fn test_sqlite_backed_log_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("journal.db");
        let record = note("persisted");

        {
            let log = ObservationLog::new(SqliteStore::open(&db_path).unwrap());
            log.append(record.clone()).await.unwrap();
        }

        let log = ObservationLog::new(SqliteStore::open(&db_path).unwrap());
        assert_eq!(log.load_all().await.unwrap(), vec![record]);

        log.clear_all().await.unwrap();
        assert!(log.load_all().await.unwrap().is_empty());
    }
}
