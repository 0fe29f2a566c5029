//! Resolution of file references against the local cache and the hub
//!
//! A [`Resolver`] turns a `sha1://`, `kbucket://` or plain path reference into
//! a local path or a reachable download URL, and can fetch remote results into
//! the [`ContentStore`](kbucket_cache::ContentStore). A [`DirectoryView`]
//! enumerates local and remote directories.

pub mod directory;
pub mod request;
pub mod resolver;

pub use directory::{DirEntry, DirectoryView, FileEntry, ListOptions, Listing};
pub use request::{ResolveRequest, ResolverPolicy};
pub use resolver::{Location, Resolved, Resolver};
