//! API Handlers
//!
//! HTTP request handlers for the admin endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::State, Json};

use crate::cache::SharedCache;
use crate::config::Config;
use crate::error::Result;
use crate::models::{HealthResponse, SnapshotResponse, StatsResponse};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache handle
    pub cache: SharedCache,
    /// Where `POST /snapshot` writes to
    pub snapshot_path: Arc<PathBuf>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: SharedCache, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            cache,
            snapshot_path: Arc::new(snapshot_path.into()),
        }
    }

    /// Creates a new AppState with an empty cache sized from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            SharedCache::with_capacity(config.max_entries),
            config.snapshot_path.clone(),
        )
    }
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    Json(StatsResponse::from(&stats))
}

/// Handler for POST /snapshot
///
/// Writes a snapshot immediately instead of waiting for the next interval.
pub async fn snapshot_handler(State(state): State<AppState>) -> Result<Json<SnapshotResponse>> {
    let entries = state.cache.save_snapshot(&state.snapshot_path).await?;
    Ok(Json(SnapshotResponse::new(
        state.snapshot_path.display().to_string(),
        entries,
    )))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
