//! TCP Listener
//!
//! Accept loop for the text protocol. Each connection gets its own task.

use std::future::Future;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::cache::SharedCache;
use crate::server::connection::handle_connection;

/// Accepts clients on `listener` until `shutdown` resolves.
///
/// Accept errors are logged and the loop keeps going. Connections that are
/// already open are not interrupted by shutdown.
pub async fn serve<F>(
    listener: TcpListener,
    cache: SharedCache,
    default_ttl: Duration,
    shutdown: F,
) where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    if let Ok(addr) = listener.local_addr() {
        info!("Text protocol listening on {}", addr);
    }

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Text protocol listener stopped");
                return;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!(%peer, "Client connected");
                    let cache = cache.clone();
                    tokio::spawn(async move {
                        match handle_connection(stream, cache, default_ttl).await {
                            Ok(()) => debug!(%peer, "Client disconnected"),
                            Err(err) => debug!(%peer, error = %err, "Client connection closed"),
                        }
                    });
                }
                Err(err) => warn!(error = %err, "Error accepting connection"),
            },
        }
    }
}
