use super::{ContentHash, ShareId};
use crate::constants::{KBUCKET_URI_PREFIX, SHA1_URI_PREFIX};
use crate::errors::{Error, Result};
use std::fmt::{self, Display};
use std::path::PathBuf;

/// What a caller asked for, classified once at the resolver boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Any string that is not one of the URI forms
    ExplicitPath(PathBuf),
    /// `sha1://<hash>[/<name>]`
    ContentHashUri {
        hash: ContentHash,
        name: Option<String>,
    },
    /// `kbucket://<share>/<path...>`
    NamespacedPathUri { namespace: ShareId, path: String },
}

impl Reference {
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(Error::configuration("reference must not be empty"));
        }

        if let Some(rest) = input.strip_prefix(SHA1_URI_PREFIX) {
            let (hash, name) = match rest.split_once('/') {
                Some((hash, name)) => (hash, Some(name)),
                None => (rest, None),
            };
            let hash = ContentHash::parse(hash).map_err(|_| {
                Error::configuration(format!("malformed content hash reference '{input}'"))
            })?;
            return Ok(Reference::ContentHashUri {
                hash,
                name: name.filter(|n| !n.is_empty()).map(str::to_string),
            });
        }

        if let Some(rest) = input.strip_prefix(KBUCKET_URI_PREFIX) {
            let (namespace, path) = rest.split_once('/').unwrap_or((rest, ""));
            let namespace = ShareId::parse(namespace)?;
            return Ok(Reference::NamespacedPathUri {
                namespace,
                path: path.to_string(),
            });
        }

        Ok(Reference::ExplicitPath(PathBuf::from(input)))
    }

    /// The content hash carried by the reference itself, if any
    pub fn content_hash(&self) -> Option<&ContentHash> {
        match self {
            Reference::ContentHashUri { hash, .. } => Some(hash),
            _ => None,
        }
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::ExplicitPath(path) => write!(f, "{}", path.display()),
            Reference::ContentHashUri { hash, name: None } => write!(f, "{SHA1_URI_PREFIX}{hash}"),
            Reference::ContentHashUri {
                hash,
                name: Some(name),
            } => write!(f, "{SHA1_URI_PREFIX}{hash}/{name}"),
            Reference::NamespacedPathUri { namespace, path } => {
                write!(f, "{KBUCKET_URI_PREFIX}{namespace}/{path}")
            }
        }
    }
}
