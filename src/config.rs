//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold (0 = unbounded)
    pub max_entries: usize,
    /// TTL in seconds applied to `SET` commands that omit a duration
    pub default_ttl: u64,
    /// Text protocol TCP port
    pub server_port: u16,
    /// Admin HTTP port (0 = disabled)
    pub admin_port: u16,
    /// Active expiry sweep interval in seconds (0 = disabled)
    pub sweep_interval: u64,
    /// Snapshot save interval in seconds (0 = disabled)
    pub snapshot_interval: u64,
    /// Location of the snapshot file
    pub snapshot_path: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries, 0 disables eviction (default: 1000)
    /// - `DEFAULT_TTL` - TTL for `SET` without seconds (default: 86400)
    /// - `SERVER_PORT` - Text protocol port (default: 8080)
    /// - `ADMIN_PORT` - Admin HTTP port, 0 disables it (default: 3000)
    /// - `SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    /// - `SNAPSHOT_INTERVAL` - Snapshot frequency in seconds (default: 300)
    /// - `SNAPSHOT_PATH` - Snapshot file location (default: `cache.snapshot`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            admin_port: env_or("ADMIN_PORT", defaults.admin_port),
            sweep_interval: env_or("SWEEP_INTERVAL", defaults.sweep_interval),
            snapshot_interval: env_or("SNAPSHOT_INTERVAL", defaults.snapshot_interval),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
        }
    }

    /// TTL applied to writes that do not carry their own duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: 86_400,
            server_port: 8080,
            admin_port: 3000,
            sweep_interval: 1,
            snapshot_interval: 300,
            snapshot_path: PathBuf::from("cache.snapshot"),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
