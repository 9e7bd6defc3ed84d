//! Snapcache - An in-memory cache server
//!
//! LRU eviction, TTL expiration and periodic snapshots behind a line-based
//! text protocol, with a small HTTP admin surface.

pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod tasks;

pub use api::AppState;
pub use cache::SharedCache;
pub use config::Config;
pub use tasks::BackgroundTasks;
