//! Cache Module
//!
//! Provides in-memory caching with LRU eviction, TTL expiration and
//! snapshot persistence.

mod entry;
mod lru;
mod shared;
pub mod snapshot;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use lru::LruIndex;
pub use shared::SharedCache;
pub use snapshot::{RestoreReport, SnapshotRecord};
pub use stats::CacheStats;
pub use store::CacheStore;
