//! Share alias translation
//!
//! A share segment of the form `<collection>.<key>` is looked up in a
//! key-value naming service; the value is the real share id.

use async_trait::async_trait;
use kbucket_core::{Error, Result};
use std::collections::HashMap;

/// Key-value lookup used to translate share aliases
#[async_trait]
pub trait AliasResolver: Send + Sync {
    /// The value stored under `key` in `collection`, if any
    async fn get(&self, key: &str, collection: &str) -> Result<Option<String>>;
}

/// Fixed in-memory alias table
#[derive(Debug, Clone, Default)]
pub struct StaticAliases {
    entries: HashMap<(String, String), String>,
}

impl StaticAliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        collection: impl Into<String>,
        key: impl Into<String>,
        share_id: impl Into<String>,
    ) -> Self {
        self.insert(collection, key, share_id);
        self
    }

    pub fn insert(
        &mut self,
        collection: impl Into<String>,
        key: impl Into<String>,
        share_id: impl Into<String>,
    ) {
        self.entries
            .insert((collection.into(), key.into()), share_id.into());
    }
}

#[async_trait]
impl AliasResolver for StaticAliases {
    async fn get(&self, key: &str, collection: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .get(&(collection.to_string(), key.to_string()))
            .cloned())
    }
}

/// Used when no naming service is configured; every alias lookup fails
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAliases;

#[async_trait]
impl AliasResolver for NoAliases {
    async fn get(&self, key: &str, collection: &str) -> Result<Option<String>> {
        Err(Error::alias(
            format!("{collection}.{key}"),
            "no alias service is configured",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_aliases() {
        let aliases = StaticAliases::new().with("lab", "public", "a1b2c3");
        assert_eq!(
            aliases.get("public", "lab").await.unwrap().as_deref(),
            Some("a1b2c3")
        );
        assert!(aliases.get("private", "lab").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_aliases_fails() {
        let err = NoAliases.get("public", "lab").await.unwrap_err();
        assert!(matches!(err, Error::Alias { .. }));
    }
}
