//! Server Lifecycle
//!
//! Wires the cache, listeners and background loops together and tears them
//! down in order once the shutdown future resolves.

use std::future::Future;
use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::server;
use crate::tasks::{restore_on_startup, BackgroundTasks};

/// Runs the server until `shutdown` resolves.
///
/// Both sockets are bound before any background loop starts. After
/// shutdown, listeners stop first and the final snapshot is written even
/// if a listener failed.
pub async fn run<F>(config: &Config, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let state = AppState::from_config(config);
    let cache = state.cache.clone();
    restore_on_startup(&cache, &config.snapshot_path).await;
    info!(entries = cache.len().await, "Cache store initialized");

    let admin_listener = if config.admin_port > 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.admin_port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind admin API on {addr}"))?;
        info!("Admin API listening on http://{}", addr);
        Some(listener)
    } else {
        None
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind text protocol on {addr}"))?;

    let tasks = BackgroundTasks::start(cache.clone(), config);
    if tasks.is_empty() {
        info!("No background tasks running");
    } else {
        info!(count = tasks.len(), "Background tasks started");
    }

    let (stop_tx, stop_rx) = watch::channel(false);

    let admin = admin_listener.map(|listener| {
        let app = create_router(state);
        let stop = stopped(stop_rx.clone());
        tokio::spawn(async move { axum::serve(listener, app).with_graceful_shutdown(stop).await })
    });

    let serving = tokio::spawn(server::serve(
        listener,
        cache,
        config.default_ttl(),
        stopped(stop_rx),
    ));

    shutdown.await;
    let _ = stop_tx.send(true);

    let served = serving.await;
    let admin_served = match admin {
        Some(handle) => Some(handle.await),
        None => None,
    };

    tasks.shutdown().await;

    served.context("text protocol listener panicked")?;
    if let Some(result) = admin_served {
        result
            .context("admin API panicked")?
            .context("admin API failed")?;
    }

    Ok(())
}

/// Resolves once the stop flag flips to true or its sender is dropped.
async fn stopped(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}
