//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries, whether
//! or not anyone reads them.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a task that sweeps expired entries every `sweep_interval`.
///
/// The task exits once `shutdown_rx` observes `true` (or its sender is
/// dropped). A sweep already holding the cache lock runs to completion
/// first, so awaiting the returned handle waits for in-flight work.
///
/// # Example
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let handle = spawn_sweep_task(cache.clone(), Duration::from_secs(1), shutdown_rx);
/// // Later, during shutdown:
/// let _ = shutdown_tx.send(true);
/// handle.await?;
/// ```
pub fn spawn_sweep_task(
    cache: SharedCache,
    sweep_interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_ms = sweep_interval.as_millis() as u64,
            "Expiry sweep task started"
        );

        let mut ticker = interval_at(Instant::now() + sweep_interval, sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let removed = cache.sweep_expired().await;
                    if removed > 0 {
                        info!(removed, "Expiry sweep removed expired entries");
                    } else {
                        debug!("Expiry sweep found no expired entries");
                    }
                }
            }
        }

        info!("Expiry sweep task stopped");
    })
}
