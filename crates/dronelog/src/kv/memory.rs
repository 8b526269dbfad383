use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::trace;

use super::KeyValueStore;
use crate::error::{Error, Result};

/// In-memory key-value store.
///
/// Clones share the same underlying map. Reads and writes can be made to fail
/// on demand with [`MemoryStore::fail_reads`] and [`MemoryStore::fail_writes`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get` fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set` and `delete` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Check if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::persistence_write(key, "writes are disabled"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::persistence_read(key, "reads are disabled"));
        }
        let entries = self
            .entries
            .read()
            .map_err(|_| Error::persistence_read(key, "store lock poisoned"))?;
        trace!(key, "memory get");
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable(key)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::persistence_write(key, "store lock poisoned"))?;
        trace!(key, bytes = value.len(), "memory set");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_writable(key)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::persistence_write(key, "store lock poisoned"))?;
        trace!(key, "memory delete");
        entries.remove(key);
        Ok(())
    }
}
