//! Snapshot Task
//!
//! Periodically persists the cache to disk and restores it at startup.
//! Persistence failures are logged and never stop the cache from serving.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::cache::{RestoreReport, SharedCache};

/// Loads the snapshot at `path` into `cache`.
///
/// A missing file is the normal first start and is logged at info level.
/// Any other failure is logged as a warning and the cache stays empty.
pub async fn restore_on_startup(cache: &SharedCache, path: &Path) -> Option<RestoreReport> {
    match cache.load_snapshot(path).await {
        Ok(report) => Some(report),
        Err(err) if err.is_not_found() => {
            info!(path = %path.display(), "No snapshot found, starting with an empty cache");
            None
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "Could not load snapshot, starting with an empty cache"
            );
            None
        }
    }
}

/// Saves once, logging instead of propagating failures.
async fn save_logged(cache: &SharedCache, path: &Path) {
    if let Err(err) = cache.save_snapshot(path).await {
        warn!(path = %path.display(), error = %err, "Error saving cache snapshot");
    }
}

/// Spawns a task that writes a snapshot to `path` every `snapshot_interval`.
///
/// On shutdown the task writes one last snapshot before exiting.
pub fn spawn_snapshot_task(
    cache: SharedCache,
    path: PathBuf,
    snapshot_interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            path = %path.display(),
            interval_secs = snapshot_interval.as_secs(),
            "Snapshot task started"
        );

        let mut ticker = interval_at(Instant::now() + snapshot_interval, snapshot_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => save_logged(&cache, &path).await,
            }
        }

        save_logged(&cache, &path).await;
        info!("Snapshot task stopped");
    })
}
