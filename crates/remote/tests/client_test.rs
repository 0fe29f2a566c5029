//! Tests for RemoteClient against a mocked hub.

use kbucket_core::{ContentHash, Error};
use kbucket_remote::{FindHit, RemoteClient};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HASH: &str = "abc123abc123abc123abc123abc123abc123abc1";

fn hash() -> ContentHash {
    ContentHash::parse(HASH).unwrap()
}

async fn mount_json(server: &MockServer, at: String, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn find_returns_candidates() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        format!("/alpha/api/find/{HASH}"),
        json!({
            "success": true,
            "found": true,
            "urls": ["http://x/f", "http://y/f"],
            "results": [{"size": 42}]
        }),
    )
    .await;

    let client = RemoteClient::new(server.uri());
    let hit = client.find("alpha", &hash()).await.unwrap();

    assert_eq!(
        hit,
        Some(FindHit {
            urls: vec!["http://x/f".into(), "http://y/f".into()],
            size: Some(42),
        })
    );
}

#[tokio::test]
async fn find_not_found_is_none() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        format!("/alpha/api/find/{HASH}"),
        json!({"success": true, "found": false}),
    )
    .await;

    let client = RemoteClient::new(format!("{}/", server.uri()));
    assert!(client.find("alpha", &hash()).await.unwrap().is_none());
}

#[tokio::test]
async fn find_unsuccessful_is_protocol_error() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        format!("/alpha/api/find/{HASH}"),
        json!({"success": false, "error": "share offline"}),
    )
    .await;

    let client = RemoteClient::new(server.uri());
    let err = client.find("alpha", &hash()).await.unwrap_err();

    match err {
        Error::RemoteProtocol { message, .. } => assert!(message.contains("share offline")),
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn find_malformed_body_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = RemoteClient::new(server.uri());
    let err = client.find("alpha", &hash()).await.unwrap_err();
    assert!(matches!(err, Error::RemoteProtocol { .. }));
}

#[tokio::test]
async fn find_unreachable_hub_is_transport_error() {
    let client = RemoteClient::new("http://127.0.0.1:1");
    let err = client.find("alpha", &hash()).await.unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn file_metadata_swallows_failures() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/alpha/prv/dir/file.txt".to_string(),
        json!({"original_checksum": HASH, "original_size": 7}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/alpha/prv/missing.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = RemoteClient::new(server.uri());

    let meta = client.file_metadata("alpha", "dir/file.txt").await.unwrap();
    assert_eq!(meta["original_checksum"], HASH);
    assert!(client.file_metadata("alpha", "missing.txt").await.is_none());

    let offline = RemoteClient::new("http://127.0.0.1:1");
    assert!(offline.file_metadata("alpha", "dir/file.txt").await.is_none());
}

#[tokio::test]
async fn read_dir_success_and_failure() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/alpha/api/readdir/dir".to_string(),
        json!({
            "success": true,
            "files": [{"name": "a.dat", "size": 3, "prv": {"original_checksum": HASH}}],
            "dirs": [{"name": "sub"}]
        }),
    )
    .await;
    mount_json(
        &server,
        "/alpha/api/readdir/gone".to_string(),
        json!({"success": false, "error": "no such directory"}),
    )
    .await;

    let client = RemoteClient::new(server.uri());

    let listing = client.read_dir("alpha", "dir").await.unwrap().unwrap();
    assert_eq!(listing.files.len(), 1);
    assert_eq!(listing.files[0].checksum(), Some(HASH));
    assert_eq!(listing.dirs[0].name, "sub");

    assert!(client.read_dir("alpha", "gone").await.unwrap().is_none());
}

#[tokio::test]
async fn path_segments_are_percent_encoded() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/alpha/prv/my%20dir/a%23b%3F.txt".to_string(),
        json!({"original_checksum": HASH}),
    )
    .await;
    mount_json(
        &server,
        "/alpha/api/readdir/my%20dir".to_string(),
        json!({"success": true, "files": [], "dirs": []}),
    )
    .await;

    let client = RemoteClient::new(server.uri());

    let meta = client.file_metadata("alpha", "/my dir/a#b?.txt").await.unwrap();
    assert_eq!(meta["original_checksum"], HASH);
    assert!(client.read_dir("alpha", "my dir/").await.unwrap().is_some());
}

#[tokio::test]
async fn probe_reports_reachability() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = RemoteClient::new(server.uri());

    assert!(client.probe(&format!("{}/ok", server.uri())).await);
    assert!(!client.probe(&format!("{}/missing", server.uri())).await);
    assert!(!client.probe("http://127.0.0.1:1/f").await);
}
