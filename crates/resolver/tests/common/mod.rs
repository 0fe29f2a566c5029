//! Shared helpers for resolver tests: a resolver wired to a temporary store
//! and a mock hub, plus a few ways of answering hub requests.

#![allow(dead_code)]

use async_trait::async_trait;
use kbucket_cache::ContentStore;
use kbucket_core::{ContentHash, Result};
use kbucket_remote::{AliasResolver, RemoteClient, StaticAliases};
use kbucket_resolver::{Resolver, ResolverPolicy};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestResolver {
    pub resolver: Resolver,
    pub server: MockServer,
    pub temp_dir: TempDir,
}

impl TestResolver {
    pub async fn new() -> Self {
        Self::with_aliases(Arc::new(StaticAliases::new())).await
    }

    pub async fn with_aliases(aliases: Arc<dyn AliasResolver>) -> Self {
        let server = MockServer::start().await;
        let temp_dir = TempDir::new().unwrap();
        let store = ContentStore::open(temp_dir.path().join("cache")).unwrap();
        let mut resolver = Resolver::new(store, RemoteClient::new(server.uri()), aliases);
        resolver.configure(ResolverPolicy {
            share_ids: vec!["alpha".into()],
            remote_base_url: server.uri(),
            search_local: true,
            search_remote: true,
        });
        Self {
            resolver,
            server,
            temp_dir,
        }
    }

    pub fn url(&self, tail: &str) -> String {
        format!("{}{}", self.server.uri(), tail)
    }

    /// `share` answers a find for `hash` with the given candidate URLs
    pub async fn mount_find(&self, share: &str, hash: &ContentHash, urls: &[String], size: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/{share}/api/find/{hash}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "found": true,
                "urls": urls,
                "results": [{"size": size}]
            })))
            .mount(&self.server)
            .await;
    }

    /// `at` is downloadable and answers probes
    pub async fn mount_file(&self, at: &str, body: &[u8]) {
        Mock::given(method("HEAD"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200))
            .mount(&self.server)
            .await;
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .mount(&self.server)
            .await;
    }

    pub async fn mount_json(&self, at: String, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}

/// Alias table that counts lookups
#[derive(Default)]
pub struct CountingAliases {
    pub inner: StaticAliases,
    pub calls: AtomicUsize,
}

impl CountingAliases {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AliasResolver for CountingAliases {
    async fn get(&self, key: &str, collection: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key, collection).await
    }
}
