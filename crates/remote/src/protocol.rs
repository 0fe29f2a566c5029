//! Wire types of the hub's JSON API

use serde::{Deserialize, Serialize};

/// Response of `GET {base}/{share}/api/find/{hash}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub results: Vec<FindResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindResult {
    #[serde(default)]
    pub size: Option<u64>,
}

/// Response of `GET {base}/{share}/api/readdir/{path}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadDirResponse {
    pub success: bool,
    #[serde(default)]
    pub files: Vec<RemoteFile>,
    #[serde(default)]
    pub dirs: Vec<RemoteDir>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub prv: Option<FileMetadata>,
}

impl RemoteFile {
    /// The content checksum the listing carries for this file, if any
    pub fn checksum(&self) -> Option<&str> {
        self.prv.as_ref()?.original_checksum.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteDir {
    pub name: String,
}

/// The part of a file's metadata object the resolver relies on
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(default)]
    pub original_checksum: Option<String>,
}
