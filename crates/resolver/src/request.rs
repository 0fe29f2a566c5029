//! Resolver policy and per-call requests

use kbucket_config::Config;
use kbucket_core::{ContentHash, Error, Result, ShareId};

/// Where a [`Resolver`](crate::Resolver) searches by default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverPolicy {
    /// Shares queried by hash, in priority order
    pub share_ids: Vec<String>,
    pub remote_base_url: String,
    pub search_local: bool,
    pub search_remote: bool,
}

impl ResolverPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            share_ids: config.share_ids().to_vec(),
            remote_base_url: config.remote_url().to_string(),
            search_local: config.load_local(),
            search_remote: config.load_remote(),
        }
    }

    pub fn with_share_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.share_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_search_local(mut self, enabled: bool) -> Self {
        self.search_local = enabled;
        self
    }

    pub fn with_search_remote(mut self, enabled: bool) -> Self {
        self.search_remote = enabled;
        self
    }
}

/// What a caller asks the resolver for
///
/// Exactly one source is given: a reference string, an explicit hash, or a
/// key in the naming service whose value is a hash. The remaining fields
/// override the resolver's policy for this call only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveRequest {
    pub(crate) reference: Option<String>,
    pub(crate) hash: Option<ContentHash>,
    pub(crate) key: Option<(String, String)>,
    pub(crate) shares: Option<Vec<String>>,
    pub(crate) local: Option<bool>,
    pub(crate) remote: Option<bool>,
}

/// The source of a request once its fields have been checked
pub(crate) enum Source<'a> {
    Reference(&'a str),
    Hash(&'a ContentHash),
    Key { collection: &'a str, key: &'a str },
}

impl ResolveRequest {
    pub fn reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Self::default()
        }
    }

    pub fn hash(hash: ContentHash) -> Self {
        Self {
            hash: Some(hash),
            ..Self::default()
        }
    }

    /// Look the hash up under `key` in `collection` of the naming service
    pub fn keyed(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            key: Some((collection.into(), key.into())),
            ..Self::default()
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_hash(mut self, hash: ContentHash) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Query these shares instead of the configured ones
    pub fn with_shares<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shares = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_local(mut self, enabled: bool) -> Self {
        self.local = Some(enabled);
        self
    }

    pub fn with_remote(mut self, enabled: bool) -> Self {
        self.remote = Some(enabled);
        self
    }

    pub(crate) fn source(&self) -> Result<Source<'_>> {
        match (&self.reference, &self.hash, &self.key) {
            (Some(reference), None, None) => Ok(Source::Reference(reference)),
            (None, Some(hash), None) => Ok(Source::Hash(hash)),
            (None, None, Some((collection, key))) => Ok(Source::Key { collection, key }),
            (None, None, None) => Err(Error::configuration(
                "nothing to resolve: give a reference, a hash or a key",
            )),
            _ => Err(Error::configuration(
                "cannot specify more than one of reference, hash and key",
            )),
        }
    }

    /// Shares for a hash lookup, from the override or the policy
    pub(crate) fn share_ids(&self, policy: &ResolverPolicy) -> Result<Vec<ShareId>> {
        self.shares
            .as_deref()
            .unwrap_or(&policy.share_ids)
            .iter()
            .map(|id| ShareId::parse(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0123456789abcdef0123456789abcdef01234567";

    fn policy() -> ResolverPolicy {
        ResolverPolicy {
            share_ids: vec!["alpha".into(), "lab.public".into()],
            remote_base_url: "http://hub".into(),
            search_local: true,
            search_remote: false,
        }
    }

    #[test]
    fn test_single_source() {
        let request = ResolveRequest::reference("data.bin");
        assert!(matches!(request.source(), Ok(Source::Reference("data.bin"))));

        let request = ResolveRequest::keyed("lab", "result");
        assert!(matches!(
            request.source(),
            Ok(Source::Key {
                collection: "lab",
                key: "result"
            })
        ));
    }

    #[test]
    fn test_reference_and_hash_conflict() {
        let hash = ContentHash::parse(HASH).unwrap();
        let request = ResolveRequest::reference("data.bin").with_hash(hash);
        assert!(matches!(
            request.source(),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(
            ResolveRequest::default().source(),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_share_override() {
        let request = ResolveRequest::reference("x");
        let shares = request.share_ids(&policy()).unwrap();
        assert_eq!(shares.len(), 2);
        assert!(shares[1].is_alias());

        let request = request.with_shares(["beta"]);
        let shares = request.share_ids(&policy()).unwrap();
        assert_eq!(shares, vec![ShareId::Direct("beta".into())]);

        let request = ResolveRequest::reference("x").with_shares(["bad/share"]);
        assert!(request.share_ids(&policy()).is_err());
    }
}
