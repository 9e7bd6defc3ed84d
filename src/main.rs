//! Snapcache - An in-memory cache server
//!
//! LRU eviction, TTL expiration and periodic snapshots behind a line-based
//! text protocol, with a small HTTP admin surface.

use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapcache::Config;

/// Main entry point for the Snapcache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and restore the last snapshot
/// 4. Bind the text protocol and, if enabled, the admin HTTP listener
/// 5. Start the expiry sweep and snapshot tasks, then serve
/// 6. On SIGINT/SIGTERM stop accepting, then stop background tasks
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Snapcache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, default_ttl={}s, port={}, admin_port={}, sweep_interval={}s, snapshot_interval={}s, snapshot_path={}",
        config.max_entries,
        config.default_ttl,
        config.server_port,
        config.admin_port,
        config.sweep_interval,
        config.snapshot_interval,
        config.snapshot_path.display()
    );

    snapcache::app::run(&config, shutdown_signal()).await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
