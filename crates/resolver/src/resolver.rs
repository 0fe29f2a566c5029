//! The resolution algorithm
//!
//! A reference is classified once. Plain paths are answered from the file
//! system. Everything else becomes a content hash, which is looked up in the
//! local store first and then, share by share, on the hub, where the first
//! candidate URL answering a probe wins. Nothing is downloaded by
//! [`Resolver::resolve`]; the `fetch_*` operations do that.

use crate::directory::DirectoryView;
use crate::request::{ResolveRequest, ResolverPolicy, Source};
use kbucket_cache::ContentStore;
use kbucket_config::Config;
use kbucket_core::{ContentHash, Error, Reference, Result, ShareId};
use kbucket_remote::{AliasResolver, RemoteClient};
use kbucket_utils::atomic_file::read_json;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a resolved file can be read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    Remote(String),
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(path) => write!(f, "{}", path.display()),
            Location::Remote(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub location: Location,
    /// Absent for plain paths, which are trusted as given
    pub hash: Option<ContentHash>,
    pub size: Option<u64>,
}

/// A request narrowed down to a hash, or answered outright
enum Target {
    Hash(ContentHash),
    /// Hash from a `kbucket://` reference; only its own share is searched
    Namespaced { hash: ContentHash, share_id: String },
    Done(Option<Resolved>),
}

pub struct Resolver {
    store: ContentStore,
    remote: RemoteClient,
    aliases: Arc<dyn AliasResolver>,
    policy: ResolverPolicy,
    alias_memo: Mutex<HashMap<String, String>>,
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("store", &self.store)
            .field("remote", &self.remote)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Resolver searching locally and remotely, with no shares configured
    pub fn new(store: ContentStore, remote: RemoteClient, aliases: Arc<dyn AliasResolver>) -> Self {
        let policy = ResolverPolicy {
            share_ids: Vec::new(),
            remote_base_url: remote.base_url().to_string(),
            search_local: true,
            search_remote: true,
        };
        Self {
            store,
            remote,
            aliases,
            policy,
            alias_memo: Mutex::new(HashMap::new()),
        }
    }

    /// Resolver for a configuration; store and hub share one HTTP client
    pub fn from_config(config: &Config, aliases: Arc<dyn AliasResolver>) -> Result<Self> {
        let store = ContentStore::from_config(config)?;
        let remote = RemoteClient::new(config.remote_url()).with_http_client(store.http().clone());
        let mut resolver = Self::new(store, remote, aliases);
        resolver.configure(ResolverPolicy::from_config(config));
        Ok(resolver)
    }

    /// Replace the search policy
    pub fn configure(&mut self, policy: ResolverPolicy) {
        if policy.remote_base_url != self.remote.base_url() {
            self.remote = self.remote.with_base_url(&policy.remote_base_url);
        }
        self.policy = policy;
    }

    pub fn policy(&self) -> &ResolverPolicy {
        &self.policy
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn remote(&self) -> &RemoteClient {
        &self.remote
    }

    pub fn directory(&self) -> DirectoryView<'_> {
        DirectoryView::new(self)
    }

    /// Find where the requested file can be read, without downloading it.
    ///
    /// `Ok(None)` means it was looked for and not found.
    pub async fn resolve(&self, request: &ResolveRequest) -> Result<Option<Resolved>> {
        let search_local = request.local.unwrap_or(self.policy.search_local);
        // Only `kbucket://` references force the hub; a bare hash follows the
        // policy unless the request overrides it.
        let mut search_remote = request.remote.unwrap_or(self.policy.search_remote);

        let (hash, namespace) = match self.target(request).await? {
            Target::Done(resolved) => return Ok(resolved),
            Target::Hash(hash) => (hash, None),
            Target::Namespaced { hash, share_id } => {
                search_remote = true;
                (hash, Some(share_id))
            }
        };

        if search_local {
            if let Some(path) = self.store.locate(&hash)? {
                let size = file_len(&path)?;
                return Ok(Some(Resolved {
                    location: Location::Local(path),
                    hash: Some(hash),
                    size: Some(size),
                }));
            }
        }

        if !search_remote {
            debug!(hash = %hash, "not found locally and remote search disabled");
            return Ok(None);
        }

        let shares = match namespace {
            Some(share_id) => vec![ShareId::Direct(share_id)],
            None => request.share_ids(&self.policy)?,
        };
        self.search_shares(&hash, &shares).await
    }

    async fn target(&self, request: &ResolveRequest) -> Result<Target> {
        match request.source()? {
            Source::Hash(hash) => Ok(Target::Hash(hash.clone())),
            Source::Key { collection, key } => {
                let Some(value) = self.aliases.get(key, collection).await? else {
                    debug!(collection, key, "no value stored under key");
                    return Ok(Target::Done(None));
                };
                let hash = ContentHash::parse(&value).map_err(|_| {
                    Error::configuration(format!(
                        "value stored under {collection}.{key} is not a content hash: '{value}'"
                    ))
                })?;
                Ok(Target::Hash(hash))
            }
            Source::Reference(raw) => match Reference::parse(raw)? {
                Reference::ExplicitPath(path) => Ok(Target::Done(explicit_path(&path)?)),
                Reference::ContentHashUri { hash, .. } => Ok(Target::Hash(hash)),
                Reference::NamespacedPathUri { namespace, path } => {
                    if request.shares.is_some() {
                        return Err(Error::configuration(format!(
                            "cannot override shares for namespaced reference '{raw}'"
                        )));
                    }
                    let share_id = self.translate_share(&namespace).await?;
                    match self.namespaced_hash(raw, &share_id, &path).await? {
                        Some(hash) => Ok(Target::Namespaced { hash, share_id }),
                        None => Ok(Target::Done(None)),
                    }
                }
            },
        }
    }

    /// Content hash the hub records for `path` in `share_id`
    async fn namespaced_hash(
        &self,
        reference: &str,
        share_id: &str,
        path: &str,
    ) -> Result<Option<ContentHash>> {
        let Some(metadata) = self.remote.file_metadata(share_id, path).await else {
            debug!(reference, "no metadata for namespaced reference");
            return Ok(None);
        };
        if metadata.get("success").and_then(serde_json::Value::as_bool) == Some(false) {
            debug!(reference, "hub has no file at namespaced reference");
            return Ok(None);
        }
        let checksum = metadata
            .get("original_checksum")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| Error::remote_protocol(reference, "metadata has no original_checksum"))?;
        ContentHash::parse(checksum)
            .map(Some)
            .map_err(|_| {
                Error::remote_protocol(reference, format!("malformed original_checksum '{checksum}'"))
            })
    }

    async fn search_shares(&self, hash: &ContentHash, shares: &[ShareId]) -> Result<Option<Resolved>> {
        let mut answered = false;
        let mut last_failure = None;

        for share in shares {
            let share_id = self.translate_share(share).await?;
            match self.remote.find(&share_id, hash).await {
                Ok(Some(hit)) => {
                    answered = true;
                    for url in hit.urls {
                        if self.remote.probe(&url).await {
                            debug!(hash = %hash, share = %share_id, url = %url, "found remotely");
                            return Ok(Some(Resolved {
                                location: Location::Remote(url),
                                hash: Some(hash.clone()),
                                size: hit.size,
                            }));
                        }
                    }
                }
                Ok(None) => answered = true,
                Err(e) if e.is_transport() => {
                    warn!(share = %share_id, error = %e, "share lookup failed, trying next share");
                    last_failure = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        match last_failure {
            Some(e) if !answered => Err(e),
            _ => Ok(None),
        }
    }

    /// Real share id for a share segment, translating aliases once per resolver
    pub(crate) async fn translate_share(&self, share: &ShareId) -> Result<String> {
        let (collection, key) = match share {
            ShareId::Direct(id) => return Ok(id.clone()),
            ShareId::Alias { collection, key } => (collection, key),
        };

        let alias = share.to_string();
        let memo = self.alias_memo.lock().get(&alias).cloned();
        if let Some(id) = memo {
            return Ok(id);
        }

        let id = self
            .aliases
            .get(key, collection)
            .await?
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::alias(&alias, "alias is not defined"))?;
        debug!(alias = %alias, share = %id, "translated share alias");
        self.alias_memo.lock().insert(alias, id.clone());
        Ok(id)
    }

    /// Resolve and make sure the result is a local file, downloading it into
    /// the store when it is remote
    pub async fn fetch_to_local(&self, request: &ResolveRequest) -> Result<Option<PathBuf>> {
        let Some(resolved) = self.resolve(request).await? else {
            return Ok(None);
        };
        match (resolved.location, resolved.hash) {
            (Location::Local(path), _) => Ok(Some(path)),
            (Location::Remote(url), Some(hash)) => {
                Ok(Some(self.store.materialize(&url, &hash).await?))
            }
            (Location::Remote(url), None) => Err(Error::remote_protocol(
                url,
                "remote location resolved without a content hash",
            )),
        }
    }

    /// Resolve and place the file at `target`.
    ///
    /// Local results are copied unless they already are `target`; remote
    /// results are downloaded straight to `target`.
    pub async fn fetch_to(&self, request: &ResolveRequest, target: &Path) -> Result<Option<PathBuf>> {
        let Some(resolved) = self.resolve(request).await? else {
            return Ok(None);
        };
        match (resolved.location, resolved.hash) {
            (Location::Local(path), _) => {
                if path == target {
                    return Ok(Some(path));
                }
                if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)
                        .map_err(|e| Error::file_system(parent, "create target directory", e))?;
                }
                fs::copy(&path, target)
                    .map_err(|e| Error::file_system(target, "copy to target", e))?;
                info!(source = %path.display(), target = %target.display(), "copied file");
                Ok(Some(target.to_path_buf()))
            }
            (Location::Remote(url), Some(hash)) => {
                Ok(Some(self.store.materialize_to(&url, &hash, target).await?))
            }
            (Location::Remote(url), None) => Err(Error::remote_protocol(
                url,
                "remote location resolved without a content hash",
            )),
        }
    }

    /// Content hash of a reference.
    ///
    /// `sha1://` references carry it; `kbucket://` references are looked up on
    /// the hub; plain paths are hashed through the store.
    pub async fn hash_of(&self, reference: &str) -> Result<Option<ContentHash>> {
        match Reference::parse(reference)? {
            Reference::ContentHashUri { hash, .. } => Ok(Some(hash)),
            Reference::NamespacedPathUri { namespace, path } => {
                let share_id = self.translate_share(&namespace).await?;
                self.namespaced_hash(reference, &share_id, &path).await
            }
            Reference::ExplicitPath(path) => {
                if !path.is_file() {
                    return Ok(None);
                }
                self.store.ingest(&path).map(Some)
            }
        }
    }

    pub async fn file_size(&self, request: &ResolveRequest) -> Result<Option<u64>> {
        Ok(self.resolve(request).await?.and_then(|resolved| resolved.size))
    }

    /// Fetch the requested file and parse it as JSON
    pub async fn load_json<T: DeserializeOwned>(&self, request: &ResolveRequest) -> Result<Option<T>> {
        match self.fetch_to_local(request).await? {
            Some(path) => read_json(&path),
            None => Ok(None),
        }
    }
}

fn explicit_path(path: &Path) -> Result<Option<Resolved>> {
    if !path.is_file() {
        debug!(path = %path.display(), "explicit path is not a file");
        return Ok(None);
    }
    Ok(Some(Resolved {
        location: Location::Local(path.to_path_buf()),
        hash: None,
        size: Some(file_len(path)?),
    }))
}

fn file_len(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| Error::file_system(path, "stat", e))
}
