//! Atomic file operations so readers never observe a half-written record

use kbucket_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A sibling path with a random suffix, unique per writer
pub fn unique_temp_path(path: &Path, tag: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{tag}.{}", Uuid::new_v4().simple()))
}

/// Write data to a file atomically by writing to a temporary file and renaming
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        Error::configuration(format!("invalid file path '{}': no parent", path.display()))
    })?;

    fs::create_dir_all(parent)
        .map_err(|e| Error::file_system(parent, "create parent directory", e))?;

    let temp_path = unique_temp_path(path, "tmp");

    let result = (|| -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::file_system(&temp_path, "create temporary file", e))?;

        file.write_all(content)
            .map_err(|e| Error::file_system(&temp_path, "write to temporary file", e))?;

        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
        return result;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::file_system(path, "atomic rename", e)
    })?;

    Ok(())
}

/// Serialize `value` as JSON and write it atomically
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_vec(value)?;
    write_atomic(path, &content)
}

/// Read and parse a JSON file.
///
/// A missing file is `Ok(None)`; an unreadable or unparsable one is an error
/// the caller can decide to tolerate.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::file_system(path, "read", e)),
    };
    Ok(Some(serde_json::from_slice(&content)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        sha1: String,
        size: u64,
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("a").join("bc").join("test.txt");

        write_atomic(&file_path, b"Test").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "Test");
    }

    #[test]
    fn test_atomic_write_overwrites_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "Old content").unwrap();

        write_atomic(&file_path, b"New content").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "New content");
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("x.record.json");
        let record = Record {
            sha1: "abc".into(),
            size: 3,
        };

        write_json_atomic(&file_path, &record).unwrap();
        let loaded: Option<Record> = read_json(&file_path).unwrap();
        assert_eq!(loaded, Some(record));
    }

    #[test]
    fn test_read_json_missing_and_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.json");
        assert!(read_json::<Record>(&missing).unwrap().is_none());

        let corrupt = temp_dir.path().join("corrupt.json");
        fs::write(&corrupt, "{not json").unwrap();
        assert!(matches!(
            read_json::<Record>(&corrupt),
            Err(Error::Json { .. })
        ));
    }

    #[test]
    fn test_unique_temp_paths_differ() {
        let base = Path::new("/cache/a/bc/abc");
        let a = unique_temp_path(base, "downloading");
        let b = unique_temp_path(base, "downloading");
        assert_ne!(a, b);
        assert_eq!(a.parent(), base.parent());
    }
}
