//! Key-value persistence for dronelog.
//!
//! The observation log keeps its whole state under a single key. This module
//! defines the storage contract it relies on and two backends:
//!
//! - [`SqliteStore`]: durable, one `SQLite` table of key/value rows
//! - [`MemoryStore`]: process-local, for tests and throwaway sessions

mod memory;
pub mod schema;
mod sqlite;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Asynchronous string-valued key-value storage.
///
/// Values are UTF-8 JSON text. Implementations must make `set` all-or-nothing:
/// if it fails, a later `get` returns the previous value.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PersistenceRead`](crate::Error::PersistenceRead) if the
    /// backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PersistenceWrite`](crate::Error::PersistenceWrite) if the
    /// backend rejects the write.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PersistenceWrite`](crate::Error::PersistenceWrite) if the
    /// backend rejects the delete.
    async fn delete(&self, key: &str) -> Result<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }
}
