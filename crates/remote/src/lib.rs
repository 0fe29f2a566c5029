//! Remote collaborators of the resolver
//!
//! - [`RemoteClient`] talks to the hub: lookup by hash, per-path metadata,
//!   directory listings and reachability probes.
//! - [`AliasResolver`] translates `<collection>.<key>` share aliases into
//!   share ids.

pub mod alias;
pub mod client;
pub mod protocol;

pub use alias::{AliasResolver, NoAliases, StaticAliases};
pub use client::{FindHit, RemoteClient};
pub use protocol::{FindResponse, ReadDirResponse, RemoteDir, RemoteFile};
