//! Optimistic-write protocol tests against a stateful mock file store.

mod support;

use base64::prelude::*;
use nexus_client::{ClientConfig, NexusClient, NexusError, RetryPolicy};
use nexus_protocol::JsonRpcError;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use support::{MockServer, Received, Reply};

struct StoredFile {
    content: Vec<u8>,
    version: u64,
}

impl StoredFile {
    fn etag(&self) -> String {
        format!("v{}", self.version)
    }
}

#[derive(Default)]
struct FileStore {
    files: Mutex<HashMap<String, StoredFile>>,
}

impl FileStore {
    fn handle(&self, received: &Received) -> Reply {
        let params = &received.request.params;
        let path = params["path"].as_str().unwrap_or_default().to_string();
        let mut files = self.files.lock().unwrap();

        match received.request.method.as_str() {
            "read" => match files.get(&path) {
                Some(file) => Reply::Result(json!({
                    "content": BASE64_STANDARD.encode(&file.content),
                })),
                None => Reply::Error(JsonRpcError::file_not_found(&path)),
            },
            "write" => {
                let content = BASE64_STANDARD
                    .decode(params["content"].as_str().unwrap_or_default())
                    .unwrap();
                if let Some(expected) = params.get("if_match").and_then(Value::as_str) {
                    let current = files.get(&path).map(StoredFile::etag).unwrap_or_default();
                    if expected != current {
                        return Reply::Error(JsonRpcError::conflict(expected, &current));
                    }
                }
                let version = files.get(&path).map(|f| f.version).unwrap_or(0) + 1;
                let size = content.len() as u64;
                files.insert(path, StoredFile { content, version });
                Reply::Result(json!({
                    "etag": format!("v{version}"),
                    "version": version,
                    "modified_at": "2026-08-30T00:00:00Z",
                    "size": size,
                }))
            }
            "delete" => match files.remove(&path) {
                Some(_) => Reply::Result(json!({"deleted": true})),
                None => Reply::Error(JsonRpcError::file_not_found(&path)),
            },
            "exists" => Reply::Result(json!({"exists": files.contains_key(&path)})),
            "get_etag" => match files.get(&path) {
                Some(file) => Reply::Result(json!({"etag": file.etag()})),
                None => Reply::Error(JsonRpcError::file_not_found(&path)),
            },
            "stat" => match files.get(&path) {
                Some(file) => Reply::Result(json!({
                    "size": file.content.len(),
                    "etag": file.etag(),
                    "modified_at": "2026-08-30T00:00:00Z",
                })),
                None => Reply::Error(JsonRpcError::file_not_found(&path)),
            },
            other => Reply::Error(JsonRpcError::invalid_params(&format!(
                "Unknown method: {other}"
            ))),
        }
    }
}

async fn store_server() -> (MockServer, Arc<FileStore>) {
    let store = Arc::new(FileStore::default());
    let handler_store = store.clone();
    let server = MockServer::start(move |received| handler_store.handle(received)).await;
    (server, store)
}

fn client_for(server: &MockServer) -> NexusClient {
    let config = ClientConfig::new(server.url()).with_retry(RetryPolicy::none());
    NexusClient::new(config).unwrap()
}

#[tokio::test]
async fn test_write_read_round_trip() {
    let (server, _) = store_server().await;
    let client = client_for(&server);

    let payload: Vec<u8> = vec![0, 159, 146, 150, 10, 255];
    let receipt = client.write("/data/blob.bin", &payload).await.unwrap();
    assert_eq!(receipt.version, 1);
    assert_eq!(receipt.size, payload.len() as u64);

    assert_eq!(client.read("/data/blob.bin").await.unwrap(), payload);
}

#[tokio::test]
async fn test_unconditional_write_advances_etag() {
    let (server, _) = store_server().await;
    let client = client_for(&server);

    let first = client.write("/data/a.txt", b"one").await.unwrap();
    let second = client.write("/data/a.txt", b"two").await.unwrap();
    assert_ne!(first.etag, second.etag);
    assert_eq!(second.version, first.version + 1);
}

#[tokio::test]
async fn test_conditional_write_with_current_etag_succeeds() {
    let (server, _) = store_server().await;
    let client = client_for(&server);

    let receipt = client.write("/data/a.txt", b"one").await.unwrap();
    let updated = client
        .write_if_match("/data/a.txt", b"two", &receipt.etag)
        .await
        .unwrap();
    assert_ne!(updated.etag, receipt.etag);
    assert_eq!(client.read("/data/a.txt").await.unwrap(), b"two");
}

#[tokio::test]
async fn test_stale_etag_conflicts_and_leaves_file_untouched() {
    let (server, _) = store_server().await;
    let client = client_for(&server);

    let stale = client.write("/data/a.txt", b"one").await.unwrap();
    let fresh = client.write("/data/a.txt", b"two").await.unwrap();

    let err = client
        .write_if_match("/data/a.txt", b"three", &stale.etag)
        .await
        .unwrap_err();
    match err {
        NexusError::Conflict {
            expected_etag,
            current_etag,
        } => {
            assert_eq!(expected_etag, stale.etag);
            assert_eq!(current_etag, fresh.etag);
        }
        other => panic!("unexpected: {other:?}"),
    }

    assert_eq!(client.read("/data/a.txt").await.unwrap(), b"two");
    assert_eq!(client.get_etag("/data/a.txt").await.unwrap(), fresh.etag);
}

#[tokio::test]
async fn test_read_modify_write_recovers_from_conflict() {
    let (server, _) = store_server().await;
    let client = client_for(&server);

    let stale = client.write("/data/counter", b"1").await.unwrap();
    client.write("/data/counter", b"2").await.unwrap();

    let mut etag = stale.etag;
    let mut receipt = None;
    for _ in 0..3 {
        match client.write_if_match("/data/counter", b"3", &etag).await {
            Ok(r) => {
                receipt = Some(r);
                break;
            }
            Err(NexusError::Conflict { current_etag, .. }) => etag = current_etag,
            Err(other) => panic!("unexpected: {other:?}"),
        }
    }

    assert!(receipt.is_some());
    assert_eq!(client.read("/data/counter").await.unwrap(), b"3");
}

#[tokio::test]
async fn test_concurrent_conditional_writes_one_winner() {
    let (server, _) = store_server().await;
    let client = client_for(&server);

    let receipt = client.write("/data/shared", b"base").await.unwrap();

    let a = client.clone();
    let b = client.clone();
    let etag_a = receipt.etag.clone();
    let etag_b = receipt.etag.clone();
    let (ra, rb) = tokio::join!(
        tokio::spawn(async move { a.write_if_match("/data/shared", b"from-a", &etag_a).await }),
        tokio::spawn(async move { b.write_if_match("/data/shared", b"from-b", &etag_b).await }),
    );
    let outcomes = [ra.unwrap(), rb.unwrap()];

    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    let loss = outcomes.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        loss.as_ref().unwrap_err(),
        NexusError::Conflict { .. }
    ));
}

#[tokio::test]
async fn test_delete_then_absent() {
    let (server, _) = store_server().await;
    let client = client_for(&server);

    client.write("/data/a.txt", b"one").await.unwrap();
    client.delete("/data/a.txt").await.unwrap();

    assert!(!client.exists("/data/a.txt").await.unwrap());
    let err = client.read("/data/a.txt").await.unwrap_err();
    assert!(matches!(err, NexusError::FileNotFound { .. }));
}

#[tokio::test]
async fn test_empty_if_match_rejected_before_network() {
    let (server, _) = store_server().await;
    let client = client_for(&server);

    let err = client
        .write_if_match("/data/a.txt", b"x", "")
        .await
        .unwrap_err();
    assert!(matches!(err, NexusError::Validation { .. }));
    assert_eq!(server.calls(), 0);
}
