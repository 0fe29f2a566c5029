//! Read-only enumeration of local and hub directories

use crate::resolver::Resolver;
use kbucket_cache::hash_bytes;
use kbucket_core::{ContentHash, Error, Reference, Result};
use kbucket_remote::RemoteFile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Hash local files through the store. Hub listings always carry the
    /// checksums the hub reports.
    pub include_hashes: bool,
}

impl ListOptions {
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn include_hashes(mut self, include_hashes: bool) -> Self {
        self.include_hashes = include_hashes;
        self
    }
}

// Fields are declared in serialized-name order so the compact JSON of a
// listing is canonical; `DirectoryView::content_hash` hashes that JSON.

/// Contents of one directory, each list sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub dirs: Vec<DirEntry>,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<Listing>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(rename = "sha1", default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<ContentHash>,
    pub size: u64,
}

impl Listing {
    fn sort(&mut self) {
        self.dirs.sort_by(|a, b| a.name.cmp(&b.name));
        self.files.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

type ListingFuture<'b> = Pin<Box<dyn Future<Output = Result<Option<Listing>>> + Send + 'b>>;

/// Directory enumeration through a [`Resolver`]'s store and hub client
#[derive(Debug, Clone, Copy)]
pub struct DirectoryView<'a> {
    resolver: &'a Resolver,
}

impl<'a> DirectoryView<'a> {
    pub fn new(resolver: &'a Resolver) -> Self {
        Self { resolver }
    }

    /// List a `kbucket://` directory or a local one.
    ///
    /// `Ok(None)` when the hub reports the directory as unavailable. Local
    /// directories that cannot be read list as empty.
    pub async fn list(&self, reference: &str, options: ListOptions) -> Result<Option<Listing>> {
        match Reference::parse(reference)? {
            Reference::ContentHashUri { .. } => Err(Error::configuration(format!(
                "cannot list a content hash reference '{reference}'"
            ))),
            Reference::NamespacedPathUri { namespace, path } => {
                let share_id = self.resolver.translate_share(&namespace).await?;
                self.list_remote(&share_id, path.trim_matches('/').to_string(), options)
                    .await
            }
            Reference::ExplicitPath(path) => self.list_local(&path, options).map(Some),
        }
    }

    /// Hash of the canonical JSON of the recursive listing with hashes
    pub async fn content_hash(&self, reference: &str) -> Result<Option<ContentHash>> {
        let options = ListOptions::default()
            .recursive(true)
            .include_hashes(true);
        let Some(listing) = self.list(reference, options).await? else {
            return Ok(None);
        };
        let json = serde_json::to_vec(&listing)?;
        Ok(Some(hash_bytes(&json)))
    }

    fn list_remote<'b>(
        &'b self,
        share_id: &'b str,
        path: String,
        options: ListOptions,
    ) -> ListingFuture<'b> {
        Box::pin(async move {
            let Some(response) = self.resolver.remote().read_dir(share_id, &path).await? else {
                return Ok(None);
            };

            let mut listing = Listing::default();
            for file in &response.files {
                listing.files.push(FileEntry {
                    name: file.name.clone(),
                    hash: remote_checksum(share_id, file)?,
                    size: file.size,
                });
            }

            for dir in response.dirs {
                let listing_of_child = if options.recursive {
                    let child = if path.is_empty() {
                        dir.name.clone()
                    } else {
                        format!("{path}/{}", dir.name)
                    };
                    match self.list_remote(share_id, child, options).await? {
                        Some(child_listing) => Some(child_listing),
                        None => {
                            warn!(share = share_id, dir = %dir.name, "subdirectory unavailable");
                            Some(Listing::default())
                        }
                    }
                } else {
                    None
                };
                listing.dirs.push(DirEntry {
                    listing: listing_of_child,
                    name: dir.name,
                });
            }

            listing.sort();
            Ok(Some(listing))
        })
    }

    fn list_local(&self, path: &Path, options: ListOptions) -> Result<Listing> {
        let mut listing = Listing::default();

        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read directory, listing as empty");
                return Ok(listing);
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let child = entry.path();

            if child.is_file() {
                let size = fs::metadata(&child)
                    .map_err(|e| Error::file_system(&child, "stat", e))?
                    .len();
                let hash = if options.include_hashes {
                    Some(self.resolver.store().ingest(&child)?)
                } else {
                    None
                };
                listing.files.push(FileEntry { name, hash, size });
            } else if child.is_dir() {
                let nested = if options.recursive {
                    Some(self.list_local(&child, options)?)
                } else {
                    None
                };
                listing.dirs.push(DirEntry {
                    listing: nested,
                    name,
                });
            }
        }

        listing.sort();
        Ok(listing)
    }
}

fn remote_checksum(share_id: &str, file: &RemoteFile) -> Result<Option<ContentHash>> {
    file.checksum()
        .map(|checksum| {
            ContentHash::parse(checksum).map_err(|_| {
                Error::remote_protocol(
                    format!("{share_id}/{}", file.name),
                    format!("malformed original_checksum '{checksum}'"),
                )
            })
        })
        .transpose()
}
