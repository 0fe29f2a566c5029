//! Small JSON records persisted next to the cache shards

use crate::fingerprint::FileFingerprint;
use kbucket_core::ContentHash;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The hash a file had when it carried a given fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    pub sha1: ContentHash,
    pub stat: FileFingerprint,
}

impl FingerprintRecord {
    pub fn new(sha1: ContentHash, stat: FileFingerprint) -> Self {
        Self { sha1, stat }
    }

    pub fn path(&self) -> &Path {
        &self.stat.path
    }
}

/// Local paths believed to hold the bytes of one hash, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintSet {
    pub files: Vec<FingerprintRecord>,
}

impl HintSet {
    /// Add a hint, replacing any earlier hint for the same path in place
    pub fn upsert(&mut self, record: FingerprintRecord) {
        match self
            .files
            .iter_mut()
            .find(|existing| existing.path() == record.path())
        {
            Some(existing) => *existing = record,
            None => self.files.push(record),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(path: &str, size: u64) -> FingerprintRecord {
        FingerprintRecord::new(
            ContentHash::parse(&"a".repeat(40)).unwrap(),
            FileFingerprint {
                ctime: 0,
                ino: 1,
                mtime: 0,
                path: PathBuf::from(path),
                size,
            },
        )
    }

    #[test]
    fn test_upsert_keeps_insertion_order() {
        let mut hints = HintSet::default();
        hints.upsert(record("/a", 1));
        hints.upsert(record("/b", 1));
        hints.upsert(record("/a", 2));

        assert_eq!(hints.len(), 2);
        assert_eq!(hints.files[0].path(), Path::new("/a"));
        assert_eq!(hints.files[0].stat.size, 2);
        assert_eq!(hints.files[1].path(), Path::new("/b"));
    }

    #[test]
    fn test_serialized_shape() {
        let mut hints = HintSet::default();
        hints.upsert(record("/a", 1));
        let json: serde_json::Value = serde_json::to_value(&hints).unwrap();
        assert_eq!(json["files"][0]["sha1"], "a".repeat(40));
        assert_eq!(json["files"][0]["stat"]["path"], "/a");
    }
}
