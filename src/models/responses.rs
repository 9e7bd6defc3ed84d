//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses, expired reads included
    pub misses: u64,
    /// Number of LRU evictions
    pub evictions: u64,
    /// Expired entries removed, by read or by sweep
    pub expirations: u64,
    /// Entries found expired on read
    pub passive_expirations: u64,
    /// Entries removed by the background sweep
    pub active_expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<&CacheStats> for StatsResponse {
    fn from(stats: &CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations(),
            passive_expirations: stats.passive_expirations,
            active_expirations: stats.active_expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the snapshot endpoint (POST /snapshot)
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotResponse {
    /// Success message
    pub message: String,
    /// Number of entries written
    pub entries: usize,
}

impl SnapshotResponse {
    /// Creates a new SnapshotResponse
    pub fn new(path: impl Into<String>, entries: usize) -> Self {
        Self {
            message: format!("Snapshot written to '{}'", path.into()),
            entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
