//! Shared Cache Module
//!
//! Thread-safe handle around a single `CacheStore`. One mutex guards every
//! operation, including snapshot I/O. Reads reorder the recency list, so
//! there is no shared-read path.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::cache::snapshot::{self, RestoreReport};
use crate::cache::{CacheStats, CacheStore};
use crate::error::Result;

// == Shared Cache ==
/// Cloneable handle to a cache store shared across tasks.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<Mutex<CacheStore>>,
}

impl SharedCache {
    /// Wraps an existing store.
    pub fn new(store: CacheStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Creates an empty cache holding at most `max_entries` (0 = unbounded).
    pub fn with_capacity(max_entries: usize) -> Self {
        Self::new(CacheStore::new(max_entries))
    }

    /// Stores a value. A zero `ttl` means it never expires.
    pub async fn set(&self, key: String, value: Vec<u8>, ttl: Duration) {
        self.inner.lock().await.write(key, value, ttl);
    }

    /// Returns the value for `key`, or None if absent or expired.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.lock().await.read(key)
    }

    /// Removes `key`. Returns whether it was present.
    pub async fn delete(&self, key: &str) -> bool {
        self.inner.lock().await.remove(key)
    }

    /// Runs one active expiry pass.
    pub async fn sweep_expired(&self) -> usize {
        self.inner.lock().await.sweep_expired()
    }

    // == Snapshot Save ==
    /// Writes the whole cache to `path`. Returns the number of records.
    ///
    /// The lock is held until the file is in place, so every other operation
    /// waits for the disk.
    pub async fn save_snapshot(&self, path: &Path) -> Result<usize> {
        let store = self.inner.lock().await;
        let records = store.export_records();
        let bytes = snapshot::encode(&records)?;
        snapshot::write_file(path, &bytes).await?;
        drop(store);

        info!(
            path = %path.display(),
            entries = records.len(),
            "Cache saved to snapshot"
        );
        Ok(records.len())
    }

    // == Snapshot Load ==
    /// Rebuilds entries from the snapshot at `path` on top of the current
    /// contents.
    pub async fn load_snapshot(&self, path: &Path) -> Result<RestoreReport> {
        let mut store = self.inner.lock().await;
        let records = snapshot::read_file(path).await?;
        let report = store.restore_records(records);
        drop(store);

        info!(
            path = %path.display(),
            restored = report.restored,
            expired = report.expired,
            untimed = report.untimed,
            "Cache loaded from snapshot"
        );
        Ok(report)
    }

    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Locks the store for several operations in one critical section.
    pub async fn lock(&self) -> MutexGuard<'_, CacheStore> {
        self.inner.lock().await
    }
}
