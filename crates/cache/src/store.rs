//! The content-addressed file store
//!
//! Layout under the root directory, for a hash `c0c1c2...`:
//!
//! ```text
//! <root>/c0/c1c2/<hash>              cached bytes
//! <root>/c0/c1c2/<hash>.hints.json   local paths known to hold the bytes
//! <root>/k0/k1k2/<key>.record.json   fingerprint -> hash, keyed by the
//!                                    hash of the fingerprint
//! ```
//!
//! Nothing here takes a lock. Entries are only ever put in place by rename,
//! and every downloaded entry is verified against its hash before that
//! rename, so concurrent writers of the same hash are harmless. The store
//! never evicts anything; stale hints and records are dropped lazily.

use crate::download::download_to;
use crate::fingerprint::FileFingerprint;
use crate::hashing::hash_file;
use crate::records::{FingerprintRecord, HintSet};
use kbucket_config::Config;
use kbucket_core::{
    constants::{HINTS_SUFFIX, RECORD_SUFFIX},
    ContentHash, Error, Result,
};
use kbucket_utils::atomic_file::{read_json, unique_temp_path, write_json_atomic};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How `ingest` obtained a hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashOutcome {
    /// Reused from a fingerprint record; the file's bytes were not read
    Recalled,
    /// Computed by reading the file
    Computed,
}

/// Local cache of files keyed by content hash
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
    http: reqwest::Client,
}

impl ContentStore {
    /// Open (creating if needed) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| Error::file_system(&root, "create cache directory", e))?;
        Ok(Self {
            root,
            http: reqwest::Client::new(),
        })
    }

    /// Open the store named by the configuration, with its request timeout
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::transport(config.remote_url(), e))?;
        Ok(Self::open(config.cache_dir())?.with_http_client(http))
    }

    /// Use `http` for downloads
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// The client downloads go through
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the entry for `hash` lives, whether or not it exists
    pub fn entry_path(&self, hash: &ContentHash) -> PathBuf {
        let (first, second) = hash.shard();
        self.root.join(first).join(second).join(hash.as_str())
    }

    fn hints_path(&self, hash: &ContentHash) -> PathBuf {
        with_suffix(self.entry_path(hash), HINTS_SUFFIX)
    }

    fn record_path(&self, key: &ContentHash) -> PathBuf {
        with_suffix(self.entry_path(key), RECORD_SUFFIX)
    }

    /// Entry path with its shard directory created
    fn prepare_entry(&self, hash: &ContentHash) -> Result<PathBuf> {
        let entry = self.entry_path(hash);
        if let Some(shard) = entry.parent() {
            fs::create_dir_all(shard)
                .map_err(|e| Error::file_system(shard, "create shard directory", e))?;
        }
        Ok(entry)
    }

    /// Find a local file holding the bytes of `hash`.
    ///
    /// The cache entry wins. Otherwise the hints are checked in insertion
    /// order and the first one whose fingerprint still matches is returned;
    /// hints that no longer match are purged, and an empty hint set is
    /// deleted.
    pub fn locate(&self, hash: &ContentHash) -> Result<Option<PathBuf>> {
        let entry = self.entry_path(hash);
        if entry.is_file() {
            debug!(hash = %hash, "cache entry hit");
            return Ok(Some(entry));
        }

        let hints_path = self.hints_path(hash);
        let hints: HintSet = match read_json(&hints_path) {
            Ok(Some(hints)) => hints,
            Ok(None) => {
                debug!(hash = %hash, "cache miss");
                return Ok(None);
            }
            Err(e) => {
                warn!(path = %hints_path.display(), error = %e, "removing unreadable hints file");
                remove_quietly(&hints_path);
                return Ok(None);
            }
        };

        let total = hints.len();
        let surviving = HintSet {
            files: hints
                .files
                .into_iter()
                .filter(|hint| hint.sha1 == *hash && matches!(hint.stat.is_current(), Ok(true)))
                .collect(),
        };

        if surviving.is_empty() {
            debug!(hash = %hash, purged = total, "all hints stale");
            remove_quietly(&hints_path);
            return Ok(None);
        }

        if surviving.len() != total {
            debug!(hash = %hash, purged = total - surviving.len(), "purged stale hints");
            if let Err(e) = write_json_atomic(&hints_path, &surviving) {
                warn!(path = %hints_path.display(), error = %e, "failed to rewrite hints file");
            }
        }

        let found = surviving.files[0].path().to_path_buf();
        debug!(hash = %hash, path = %found.display(), "hint hit");
        Ok(Some(found))
    }

    /// Content hash of the file at `path`, reusing a previous computation
    /// when the file's fingerprint has not changed
    pub fn ingest(&self, path: &Path) -> Result<ContentHash> {
        self.ingest_with_outcome(path).map(|(hash, _)| hash)
    }

    /// Like [`ContentStore::ingest`], also reporting whether the bytes were read
    pub fn ingest_with_outcome(&self, path: &Path) -> Result<(ContentHash, HashOutcome)> {
        let fingerprint = capture_required(path)?;
        let key = fingerprint.record_key()?;

        if let Some(record) = read_tolerant::<FingerprintRecord>(&self.record_path(&key)) {
            if record.stat == fingerprint {
                debug!(path = %path.display(), hash = %record.sha1, "fingerprint record hit");
                self.remember(&key, &record)?;
                return Ok((record.sha1, HashOutcome::Recalled));
            }
        }

        let sha1 = hash_file(path)?;
        debug!(path = %path.display(), hash = %sha1, "computed content hash");
        self.remember(&key, &FingerprintRecord::new(sha1.clone(), fingerprint))?;
        Ok((sha1, HashOutcome::Computed))
    }

    /// Record that `path` currently holds the bytes of `hash`, without reading it
    pub(crate) fn ingest_known(&self, path: &Path, hash: &ContentHash) -> Result<()> {
        let fingerprint = capture_required(path)?;
        let key = fingerprint.record_key()?;
        self.remember(&key, &FingerprintRecord::new(hash.clone(), fingerprint))
    }

    fn remember(&self, key: &ContentHash, record: &FingerprintRecord) -> Result<()> {
        self.prepare_entry(key)?;
        write_json_atomic(&self.record_path(key), record)?;

        self.prepare_entry(&record.sha1)?;
        let hints_path = self.hints_path(&record.sha1);
        let mut hints = read_tolerant::<HintSet>(&hints_path).unwrap_or_default();
        hints.upsert(record.clone());
        write_json_atomic(&hints_path, &hints)
    }

    /// Move `path` into the store under its content hash.
    ///
    /// If the entry already exists the source is redundant and is deleted.
    pub fn adopt(&self, path: &Path) -> Result<(ContentHash, PathBuf)> {
        let hash = self.ingest(path)?;
        let entry = self.prepare_entry(&hash)?;

        if entry.exists() {
            if !same_path(path, &entry) {
                fs::remove_file(path)
                    .map_err(|e| Error::file_system(path, "remove redundant file", e))?;
            }
        } else if let Err(e) = fs::rename(path, &entry) {
            debug!(path = %path.display(), error = %e, "rename failed, falling back to copy");
            self.copy_into(path, &entry)?;
            fs::remove_file(path).map_err(|e| Error::file_system(path, "remove moved file", e))?;
        }

        info!(hash = %hash, path = %entry.display(), "adopted file into cache");
        Ok((hash, entry))
    }

    /// Copy `path` into the store under its content hash, leaving the source alone
    pub fn copy_in(&self, path: &Path) -> Result<(ContentHash, PathBuf)> {
        let hash = self.ingest(path)?;
        let entry = self.prepare_entry(&hash)?;

        if !entry.exists() {
            self.copy_into(path, &entry)?;
            info!(hash = %hash, path = %entry.display(), "copied file into cache");
        }

        Ok((hash, entry))
    }

    fn copy_into(&self, source: &Path, entry: &Path) -> Result<()> {
        let temp = unique_temp_path(entry, "copying");
        if let Err(e) = fs::copy(source, &temp) {
            remove_quietly(&temp);
            return Err(Error::file_system(source, "copy into cache", e));
        }
        fs::rename(&temp, entry).map_err(|e| {
            remove_quietly(&temp);
            Error::file_system(entry, "rename into cache", e)
        })
    }

    /// Download `url` into the entry for `hash`, verifying the bytes.
    ///
    /// Fails with [`Error::Verification`] (leaving nothing behind) when the
    /// downloaded content hashes to anything else.
    pub async fn materialize(&self, url: &str, hash: &ContentHash) -> Result<PathBuf> {
        let entry = self.prepare_entry(hash)?;
        self.download_verified(url, hash, &entry).await?;
        Ok(entry)
    }

    /// Download `url` to a caller-chosen `target`, verifying the bytes and
    /// remembering the target as a hint for `hash`
    pub async fn materialize_to(
        &self,
        url: &str,
        hash: &ContentHash,
        target: &Path,
    ) -> Result<PathBuf> {
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::file_system(parent, "create target directory", e))?;
        }
        self.download_verified(url, hash, target).await?;
        self.ingest_known(target, hash)?;
        Ok(target.to_path_buf())
    }

    async fn download_verified(&self, url: &str, hash: &ContentHash, dest: &Path) -> Result<()> {
        let temp = unique_temp_path(dest, "downloading");
        info!(url = %url, dest = %dest.display(), "downloading file");

        let (actual, bytes) = match download_to(&self.http, url, &temp).await {
            Ok(downloaded) => downloaded,
            Err(e) => {
                remove_quietly(&temp);
                return Err(e);
            }
        };

        if actual != *hash {
            remove_quietly(&temp);
            return Err(Error::verification(url, hash.as_str(), actual.as_str()));
        }

        fs::rename(&temp, dest).map_err(|e| {
            remove_quietly(&temp);
            Error::file_system(dest, "rename download into place", e)
        })?;

        debug!(hash = %hash, bytes, "download verified");
        Ok(())
    }
}

fn capture_required(path: &Path) -> Result<FileFingerprint> {
    FileFingerprint::capture(path)?.ok_or_else(|| {
        Error::file_system(
            path,
            "stat",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a regular file"),
        )
    })
}

fn with_suffix(path: PathBuf, suffix: &str) -> PathBuf {
    let mut raw = path.into_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Read a JSON record, treating an unreadable one as absent
fn read_tolerant<T: DeserializeOwned>(path: &Path) -> Option<T> {
    match read_json(path) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable record");
            None
        }
    }
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "unable to remove file");
        }
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
