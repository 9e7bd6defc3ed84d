//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: removes expired cache entries at configured intervals
//! - Snapshot: persists the cache at configured intervals and on shutdown

mod snapshot;
mod sweep;

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::SharedCache;
use crate::config::Config;

pub use snapshot::{restore_on_startup, spawn_snapshot_task};
pub use sweep::spawn_sweep_task;

// == Background Tasks ==
/// The running sweep and snapshot loops plus the signal that stops them.
///
/// ```ignore
/// let tasks = BackgroundTasks::start(cache.clone(), &config);
/// // ... serve traffic ...
/// tasks.shutdown().await;
/// ```
#[derive(Debug)]
pub struct BackgroundTasks {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl BackgroundTasks {
    /// Starts the loops enabled in `config`. An interval of 0 disables a loop.
    pub fn start(cache: SharedCache, config: &Config) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut handles = Vec::new();

        if config.sweep_interval > 0 {
            let handle = spawn_sweep_task(
                cache.clone(),
                Duration::from_secs(config.sweep_interval),
                shutdown_rx.clone(),
            );
            handles.push(("sweep", handle));
        } else {
            info!("Expiry sweep disabled");
        }

        if config.snapshot_interval > 0 {
            let handle = spawn_snapshot_task(
                cache,
                config.snapshot_path.clone(),
                Duration::from_secs(config.snapshot_interval),
                shutdown_rx,
            );
            handles.push(("snapshot", handle));
        } else {
            info!("Periodic snapshots disabled");
        }

        Self {
            shutdown_tx,
            handles,
        }
    }

    /// Number of loops currently running.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Signals every loop to stop and waits for in-flight work to finish.
    pub async fn shutdown(self) {
        // Receivers may already be gone if a task panicked
        let _ = self.shutdown_tx.send(true);

        for (name, handle) in self.handles {
            if let Err(err) = handle.await {
                warn!(task = name, error = %err, "Background task ended abnormally");
            }
        }
        info!("Background tasks stopped");
    }
}
