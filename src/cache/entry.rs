//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and the absolute
//! deadline arithmetic behind TTL expiration.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// Represents a single cache entry with value and expiration deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value, opaque bytes
    pub value: Vec<u8>,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry whose deadline is `now + ttl`.
    ///
    /// A zero `ttl` means the entry never expires.
    pub fn new(key: String, value: Vec<u8>, ttl: Duration) -> Self {
        Self::new_at(key, value, ttl, current_timestamp_ms())
    }

    pub(crate) fn new_at(key: String, value: Vec<u8>, ttl: Duration, now: u64) -> Self {
        Self {
            key,
            value,
            expires_at: deadline_from(ttl, now),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Same as [`is_expired`](Self::is_expired) against an explicit clock reading.
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// A clock set before the epoch reads as 0 rather than panicking.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Converts a relative TTL into an absolute deadline. Zero means "never".
pub fn deadline_from(ttl: Duration, now: u64) -> Option<u64> {
    if ttl.is_zero() {
        None
    } else {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        // Sub-millisecond TTLs still expire
        Some(now.saturating_add(ttl_ms.max(1)))
    }
}
