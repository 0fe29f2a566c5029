//! Streaming SHA-1 content hashing

use kbucket_core::{constants::HASH_CHUNK_SIZE, ContentHash, Error, Result};
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Incremental hasher producing a [`ContentHash`]
#[derive(Debug, Default, Clone)]
pub struct ContentHasher {
    hasher: Sha1,
    bytes: u64,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.bytes += chunk.len() as u64;
    }

    /// Number of bytes fed so far
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn finish(self) -> ContentHash {
        ContentHash::from_sha1_digest(self.hasher.finalize().into())
    }
}

/// Hash a file's content, reading it in fixed-size chunks
pub fn hash_file(path: &Path) -> Result<ContentHash> {
    let mut file =
        File::open(path).map_err(|e| Error::file_system(path, "open file for hashing", e))?;

    let mut hasher = ContentHasher::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| Error::file_system(path, "read file chunk for hashing", e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    if hasher.bytes() > 100 * 1024 * 1024 {
        tracing::info!(path = %path.display(), bytes = hasher.bytes(), "hashed large file");
    }

    Ok(hasher.finish())
}

/// Hash an in-memory buffer
pub fn hash_bytes(data: &[u8]) -> ContentHash {
    ContentHash::from_sha1_digest(Sha1::digest(data).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // sha1("hello world")
    const HELLO_WORLD: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";

    #[test]
    fn test_hash_bytes_known_vector() {
        assert_eq!(hash_bytes(b"hello world").as_str(), HELLO_WORLD);
        assert_eq!(
            hash_bytes(b"").as_str(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn test_hash_file_matches_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.bin");
        fs::write(&path, b"hello world").unwrap();

        assert_eq!(hash_file(&path).unwrap().as_str(), HELLO_WORLD);
    }

    #[test]
    fn test_hash_file_spanning_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("large.bin");
        let data: Vec<u8> = (0..HASH_CHUNK_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        assert_eq!(hash_file(&path).unwrap(), hash_bytes(&data));
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut hasher = ContentHasher::new();
        hasher.update(b"hello ");
        hasher.update(b"world");
        assert_eq!(hasher.bytes(), 11);
        assert_eq!(hasher.finish().as_str(), HELLO_WORLD);
    }

    #[test]
    fn test_hash_missing_file() {
        let err = hash_file(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, Error::FileSystem { .. }));
    }
}
