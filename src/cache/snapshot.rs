//! Snapshot Module
//!
//! Binary encoding of the cache contents and the file I/O that persists it.
//!
//! A snapshot is a bincode-encoded list of [`SnapshotRecord`]s, least
//! recently used first. Deadlines are stored as absolute Unix milliseconds so
//! remaining lifetimes can be recomputed at load time. There is no header and
//! no versioning; each save rewrites the whole file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{CacheError, Result};

// == Snapshot Record ==
/// One persisted entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub key: String,
    pub value: Vec<u8>,
    /// Absolute deadline in Unix milliseconds, None = never expires
    pub expires_at: Option<u64>,
}

// == Restore Report ==
/// Outcome of rebuilding a cache from snapshot records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Records re-inserted with their remaining lifetime
    pub restored: usize,
    /// Records whose deadline had already passed
    pub expired: usize,
    /// Records without a deadline. These are never restored.
    pub untimed: usize,
}

impl RestoreReport {
    /// Records that were read but not re-inserted.
    pub fn skipped(&self) -> usize {
        self.expired + self.untimed
    }
}

// == Codec ==
/// Encodes records into snapshot bytes.
pub fn encode(records: &[SnapshotRecord]) -> Result<Vec<u8>> {
    bincode::serialize(records).map_err(|e| CacheError::Encode(e.to_string()))
}

/// Decodes snapshot bytes back into records.
pub fn decode(bytes: &[u8]) -> Result<Vec<SnapshotRecord>> {
    bincode::deserialize(bytes).map_err(|e| CacheError::Decode(e.to_string()))
}

// == File I/O ==
/// Writes snapshot bytes to `path`, replacing any previous snapshot.
///
/// The bytes land in a sibling `.tmp` file first and are renamed over the
/// target, so a crash mid-write keeps the previous snapshot readable.
pub async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = tmp_path(path);

    let mut file = fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(err) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(err.into());
    }
    Ok(())
}

/// Reads and decodes the snapshot at `path`.
pub async fn read_file(path: &Path) -> Result<Vec<SnapshotRecord>> {
    let bytes = fs::read(path).await?;
    decode(&bytes)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
