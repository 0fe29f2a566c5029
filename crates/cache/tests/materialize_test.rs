//! Download-and-verify behaviour of the content store against a mock server

use kbucket_cache::{hash_bytes, hash_file, ContentStore};
use kbucket_core::Error;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BODY: &[u8] = b"raw recording bytes";

async fn serve(body: &[u8], at: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(&server)
        .await;
    server
}

/// Temporary download files left next to an entry
fn shard_leftovers(entry: &std::path::Path) -> Vec<String> {
    let shard = entry.parent().unwrap();
    if !shard.exists() {
        return Vec::new();
    }
    fs::read_dir(shard)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains("downloading"))
        .collect()
}

#[tokio::test]
async fn materialize_then_locate_round_trips() {
    let server = serve(BODY, "/f").await;
    let temp_dir = TempDir::new().unwrap();
    let store = ContentStore::open(temp_dir.path()).unwrap();
    let hash = hash_bytes(BODY);

    let entry = store
        .materialize(&format!("{}/f", server.uri()), &hash)
        .await
        .unwrap();

    assert_eq!(entry, store.entry_path(&hash));
    let located = store.locate(&hash).unwrap().unwrap();
    assert_eq!(hash_file(&located).unwrap(), hash);
    assert!(shard_leftovers(&entry).is_empty());
}

#[tokio::test]
async fn materialize_rejects_mismatched_content() {
    let server = serve(b"something else entirely", "/f").await;
    let temp_dir = TempDir::new().unwrap();
    let store = ContentStore::open(temp_dir.path()).unwrap();
    let hash = hash_bytes(BODY);

    let err = store
        .materialize(&format!("{}/f", server.uri()), &hash)
        .await
        .unwrap_err();

    match err {
        Error::Verification {
            expected, actual, ..
        } => {
            assert_eq!(expected, hash.as_str());
            assert_eq!(actual, hash_bytes(b"something else entirely").as_str());
        }
        other => panic!("expected verification error, got {other:?}"),
    }
    let entry = store.entry_path(&hash);
    assert!(!entry.exists());
    assert!(shard_leftovers(&entry).is_empty());
    assert!(store.locate(&hash).unwrap().is_none());
}

#[tokio::test]
async fn materialize_replaces_existing_entry() {
    let server = serve(BODY, "/f").await;
    let temp_dir = TempDir::new().unwrap();
    let store = ContentStore::open(temp_dir.path()).unwrap();
    let hash = hash_bytes(BODY);
    let url = format!("{}/f", server.uri());

    let entry = store.materialize(&url, &hash).await.unwrap();
    let again = store.materialize(&url, &hash).await.unwrap();

    assert_eq!(entry, again);
    assert_eq!(fs::read(&entry).unwrap(), BODY);
}

#[tokio::test]
async fn materialize_http_error_is_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let store = ContentStore::open(temp_dir.path()).unwrap();
    let hash = hash_bytes(BODY);

    let err = store
        .materialize(&format!("{}/missing", server.uri()), &hash)
        .await
        .unwrap_err();

    assert!(err.is_transport());
    let entry = store.entry_path(&hash);
    assert!(!entry.exists());
    assert!(shard_leftovers(&entry).is_empty());
}

#[tokio::test]
async fn materialize_unreachable_host_is_transport_failure() {
    let temp_dir = TempDir::new().unwrap();
    let store = ContentStore::open(temp_dir.path()).unwrap();

    let err = store
        .materialize("http://127.0.0.1:1/f", &hash_bytes(BODY))
        .await
        .unwrap_err();

    assert!(err.is_transport());
}

#[tokio::test]
async fn materialize_to_target_records_hint() {
    let server = serve(BODY, "/f").await;
    let temp_dir = TempDir::new().unwrap();
    let store = ContentStore::open(temp_dir.path().join("cache")).unwrap();
    let hash = hash_bytes(BODY);
    let target = temp_dir.path().join("out").join("recording.dat");

    let written = store
        .materialize_to(&format!("{}/f", server.uri()), &hash, &target)
        .await
        .unwrap();

    assert_eq!(written, target);
    assert_eq!(fs::read(&target).unwrap(), BODY);
    assert!(!store.entry_path(&hash).exists());
    let located = store.locate(&hash).unwrap().unwrap();
    assert_eq!(
        fs::canonicalize(located).unwrap(),
        fs::canonicalize(&target).unwrap()
    );
}
