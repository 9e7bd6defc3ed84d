//! Cache Store Module
//!
//! Main cache engine combining the LRU index with TTL expiration and
//! snapshot export/restore. Not thread-safe on its own; see `SharedCache`.

use std::time::Duration;

use tracing::debug;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::snapshot::{RestoreReport, SnapshotRecord};
use crate::cache::{CacheEntry, CacheStats, LruIndex};

// == Cache Store ==
/// Main cache storage with LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore {
    /// Entries in recency order plus key lookup
    index: LruIndex,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed, 0 = unbounded
    max_entries: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `max_entries` entries.
    ///
    /// A capacity of 0 disables eviction entirely.
    pub fn new(max_entries: usize) -> Self {
        Self {
            index: LruIndex::new(),
            stats: CacheStats::new(),
            max_entries,
        }
    }

    // == Write ==
    /// Stores a key-value pair. A zero `ttl` means the entry never expires.
    ///
    /// Writing an existing key replaces its value and deadline and marks it
    /// most recently used. Inserting a new key past capacity evicts exactly
    /// one entry, the least recently used.
    pub fn write(&mut self, key: String, value: Vec<u8>, ttl: Duration) {
        self.write_at(key, value, ttl, current_timestamp_ms());
    }

    pub(crate) fn write_at(&mut self, key: String, value: Vec<u8>, ttl: Duration, now: u64) {
        let entry = CacheEntry::new_at(key, value, ttl, now);
        let is_new = self.index.insert(entry).is_none();

        if is_new && self.max_entries > 0 && self.index.len() > self.max_entries {
            self.evict_lru();
        }

        self.stats.set_total_entries(self.index.len());
    }

    // == Read ==
    /// Retrieves a value by key, marking it most recently used.
    ///
    /// An entry found past its deadline is removed and reported as a miss.
    pub fn read(&mut self, key: &str) -> Option<Vec<u8>> {
        self.read_at(key, current_timestamp_ms())
    }

    pub(crate) fn read_at(&mut self, key: &str, now: u64) -> Option<Vec<u8>> {
        let expired = match self.index.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.index.remove(key);
            self.stats.record_passive_expiration();
            self.stats.set_total_entries(self.index.len());
            debug!(key, "Passively expired key");
            return None;
        }

        self.index.touch(key);
        self.stats.record_hit();
        self.index.get(key).map(|entry| entry.value.clone())
    }

    // == Remove ==
    /// Removes an entry by key. Returns whether the key was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.index.remove(key).is_some();
        self.stats.set_total_entries(self.index.len());
        removed
    }

    // == Evict ==
    fn evict_lru(&mut self) {
        if let Some(evicted) = self.index.pop_oldest() {
            self.stats.record_eviction();
            debug!(key = %evicted.key, "Evicted least recently used key");
        }
    }

    // == Sweep Expired ==
    /// Removes all expired entries without reordering the survivors.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self) -> usize {
        self.sweep_expired_at(current_timestamp_ms())
    }

    pub(crate) fn sweep_expired_at(&mut self, now: u64) -> usize {
        let removed = self.index.remove_where(|entry| entry.is_expired_at(now)).len();
        self.stats.record_active_expirations(removed);
        self.stats.set_total_entries(self.index.len());
        removed
    }

    // == Snapshot Export ==
    /// Copies every entry out for persistence, least recently used first.
    ///
    /// Expired entries not yet swept are included; restore drops them.
    pub fn export_records(&self) -> Vec<SnapshotRecord> {
        self.index
            .iter_oldest_first()
            .map(|entry| SnapshotRecord {
                key: entry.key.clone(),
                value: entry.value.clone(),
                expires_at: entry.expires_at,
            })
            .collect()
    }

    // == Snapshot Restore ==
    /// Re-inserts persisted records through the normal write path.
    ///
    /// Each record's remaining lifetime is `expires_at - now`. Only records
    /// with a positive remainder come back. Records without a deadline are
    /// not restored either: a relative remaining duration of zero would mean
    /// "never expires" to `write`, so they are dropped.
    pub fn restore_records(&mut self, records: Vec<SnapshotRecord>) -> RestoreReport {
        self.restore_records_at(records, current_timestamp_ms())
    }

    pub(crate) fn restore_records_at(
        &mut self,
        records: Vec<SnapshotRecord>,
        now: u64,
    ) -> RestoreReport {
        let mut report = RestoreReport::default();

        for record in records {
            match record.expires_at {
                None => report.untimed += 1,
                Some(deadline) if deadline > now => {
                    let remaining = Duration::from_millis(deadline - now);
                    self.write_at(record.key, record.value, remaining, now);
                    report.restored += 1;
                }
                Some(_) => report.expired += 1,
            }
        }

        report
    }

    // == Peek ==
    /// Looks at an entry without refreshing recency or expiring it.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.index.get(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.index.len());
        stats
    }

    /// Configured capacity, 0 = unbounded.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> Result<(), String> {
        self.index.check_invariants()?;
        if self.max_entries > 0 && self.index.len() > self.max_entries {
            return Err(format!(
                "{} entries exceed capacity {}",
                self.index.len(),
                self.max_entries
            ));
        }
        Ok(())
    }
}
