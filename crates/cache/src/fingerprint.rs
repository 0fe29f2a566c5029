//! File fingerprints: cheap metadata snapshots used to skip rehashing

use crate::hashing::hash_bytes;
use kbucket_core::{ContentHash, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Snapshot of a file's metadata at a point in time.
///
/// Fields are declared in alphabetical order so the serialized form is the
/// canonical one (keys sorted). Times are nanoseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFingerprint {
    pub ctime: i64,
    pub ino: u64,
    pub mtime: i64,
    pub path: PathBuf,
    pub size: u64,
}

impl FileFingerprint {
    /// Capture the current fingerprint of `path`.
    ///
    /// Returns `Ok(None)` when the path does not exist or is not a regular
    /// file.
    pub fn capture(path: &Path) -> Result<Option<Self>> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::file_system(path, "stat", e)),
        };

        let path = std::path::absolute(path)
            .map_err(|e| Error::file_system(path, "resolve absolute path", e))?;

        Ok(Some(Self {
            ctime: change_time(&metadata),
            ino: inode(&metadata),
            mtime: metadata.modified().map(nanos_since_epoch).unwrap_or(0),
            path,
            size: metadata.len(),
        }))
    }

    /// The serialized form used for keying and comparison
    pub fn canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Key under which the fingerprint's record is stored
    pub fn record_key(&self) -> Result<ContentHash> {
        Ok(hash_bytes(self.canonical_json()?.as_bytes()))
    }

    /// Whether `path` still has exactly this fingerprint
    pub fn is_current(&self) -> Result<bool> {
        Ok(Self::capture(&self.path)?.as_ref() == Some(self))
    }
}

fn nanos_since_epoch(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_nanos() as i64,
        Err(e) => -(e.duration().as_nanos() as i64),
    }
}

#[cfg(unix)]
fn inode(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.ino()
}

#[cfg(not(unix))]
fn inode(_metadata: &Metadata) -> u64 {
    0
}

#[cfg(unix)]
fn change_time(metadata: &Metadata) -> i64 {
    use std::os::unix::fs::MetadataExt;
    metadata.ctime() * 1_000_000_000 + metadata.ctime_nsec()
}

#[cfg(not(unix))]
fn change_time(metadata: &Metadata) -> i64 {
    metadata.created().map(nanos_since_epoch).unwrap_or(0)
}
