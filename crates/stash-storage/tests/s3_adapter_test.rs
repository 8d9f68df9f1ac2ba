mod common;

use common::{adapter, MemoryObjectClient};
use serde_json::json;
use stash_core::option_keys;
use stash_storage::{
    AmazonS3Adapter, ObjectAcl, S3AdapterConfig, StorageAdapter, StorageError,
};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::tempdir;

fn write_source(dir: &std::path::Path, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

#[tokio::test]
async fn store_uploads_then_removes_local_file() {
    let dir = tempdir().unwrap();
    let adapter = adapter(&[]);
    let source = write_source(dir.path(), "a.txt", b"hello");

    adapter.store(&source, "files/a.txt").await.unwrap();

    assert!(!source.exists());
    let stored = adapter.s3_service().object("mybucket", "files/a.txt").unwrap();
    assert_eq!(stored.data, b"hello");
    assert_eq!(stored.acl, ObjectAcl::PublicRead);
}

#[tokio::test]
async fn store_failure_keeps_local_file() {
    let dir = tempdir().unwrap();
    let adapter = adapter(&[]);
    adapter.s3_service().fail_puts.store(true, Ordering::SeqCst);
    let source = write_source(dir.path(), "a.txt", b"hello");

    let result = adapter.store(&source, "files/a.txt").await;

    assert!(matches!(result, Err(StorageError::Remote { operation: "PutObject", .. })));
    assert!(source.exists());
    assert!(adapter.s3_service().object("mybucket", "files/a.txt").is_none());
}

#[tokio::test]
async fn store_missing_source_never_reaches_remote() {
    let dir = tempdir().unwrap();
    let adapter = adapter(&[]);

    let result = adapter.store(&dir.path().join("missing.txt"), "files/a.txt").await;

    assert!(matches!(result, Err(StorageError::Io(_))));
    assert_eq!(adapter.s3_service().object_count(), 0);
}

#[tokio::test]
async fn store_with_expiration_writes_private_object() {
    let dir = tempdir().unwrap();
    let adapter = adapter(&[(option_keys::EXPIRATION, json!(15))]);
    let source = write_source(dir.path(), "a.txt", b"secret");

    adapter.store(&source, "files/a.txt").await.unwrap();

    let stored = adapter.s3_service().object("mybucket", "files/a.txt").unwrap();
    assert_eq!(stored.acl, ObjectAcl::Private);
}

#[tokio::test]
async fn move_copies_with_current_policy_and_deletes_source() {
    let adapter = adapter(&[(option_keys::EXPIRATION, json!("30"))]);
    let client = adapter.s3_service();
    client.insert("mybucket", "a.txt", b"data", ObjectAcl::PublicRead);

    adapter.move_object("a.txt", "b.txt").await.unwrap();

    assert!(client.object("mybucket", "a.txt").is_none());
    let moved = client.object("mybucket", "b.txt").unwrap();
    assert_eq!(moved.data, b"data");
    assert_eq!(moved.acl, ObjectAcl::Private);
    assert_eq!(client.object_count(), 1);
}

#[tokio::test]
async fn move_copy_failure_leaves_source_intact() {
    let adapter = adapter(&[]);
    let client = adapter.s3_service();
    client.insert("mybucket", "a.txt", b"data", ObjectAcl::PublicRead);
    client.fail_copies.store(true, Ordering::SeqCst);

    let result = adapter.move_object("a.txt", "b.txt").await;

    assert!(matches!(result, Err(StorageError::Remote { operation: "CopyObject", .. })));
    assert!(client.object("mybucket", "a.txt").is_some());
    assert!(client.object("mybucket", "b.txt").is_none());
}

#[tokio::test]
async fn move_missing_source_is_not_found() {
    let adapter = adapter(&[]);

    let result = adapter.move_object("missing.txt", "b.txt").await;

    assert!(matches!(result, Err(StorageError::NotFound { .. })));
    assert_eq!(adapter.s3_service().object_count(), 0);
}

#[tokio::test]
async fn move_onto_same_key_keeps_object() {
    let adapter = adapter(&[]);
    let client = adapter.s3_service();
    client.insert("mybucket", "a.txt", b"data", ObjectAcl::PublicRead);

    adapter.move_object("a.txt", "a.txt").await.unwrap();

    assert_eq!(client.object("mybucket", "a.txt").unwrap().data, b"data");
    assert_eq!(client.object_count(), 1);
}

#[tokio::test]
async fn move_onto_same_missing_key_is_not_found() {
    let adapter = adapter(&[]);

    let result = adapter.move_object("a.txt", "a.txt").await;

    assert!(matches!(result, Err(StorageError::NotFound { .. })));
}

#[tokio::test]
async fn access_denied_keeps_underlying_cause() {
    let dir = tempdir().unwrap();
    let adapter = adapter(&[]);
    adapter.s3_service().deny_access.store(true, Ordering::SeqCst);
    let source = write_source(dir.path(), "a.txt", b"hello");

    let err = adapter.store(&source, "files/a.txt").await.unwrap_err();

    assert!(matches!(err, StorageError::AccessDenied { ref key, .. } if key == "files/a.txt"));
    let cause = std::error::Error::source(&err).expect("access denied should carry a cause");
    assert!(cause.to_string().contains("403"));
    assert!(source.exists());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let adapter = adapter(&[]);
    adapter
        .s3_service()
        .insert("mybucket", "a.txt", b"data", ObjectAcl::PublicRead);

    adapter.delete("a.txt").await.unwrap();
    adapter.delete("a.txt").await.unwrap();

    assert!(!adapter.is_object_available("a.txt").await.unwrap());
}

#[tokio::test]
async fn delete_propagates_remote_failures() {
    let adapter = adapter(&[]);
    adapter.s3_service().fail_deletes.store(true, Ordering::SeqCst);

    let result = adapter.delete("a.txt").await;

    assert!(matches!(result, Err(StorageError::Remote { .. })));
}

#[tokio::test]
async fn public_uri_is_stable() {
    let adapter = adapter(&[]);

    let first = adapter.get_uri("files/a.txt").await.unwrap();
    let second = adapter.get_uri("files/a.txt").await.unwrap();

    assert_eq!(first, "https://mybucket.s3.amazonaws.com/files/a.txt");
    assert_eq!(first, second);
}

#[tokio::test]
async fn private_uri_is_fresh_per_call() {
    let adapter = adapter(&[(option_keys::EXPIRATION, json!(30))]);

    let first = adapter.get_uri("files/a.txt").await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = adapter.get_uri("files/a.txt").await.unwrap();

    assert!(first.contains("X-Amz-Expires=1800"));
    assert!(first.contains("X-Amz-Signature="));
    assert_ne!(first, second);
}

#[tokio::test]
async fn object_availability_reflects_presence() {
    let adapter = adapter(&[]);
    adapter
        .s3_service()
        .insert("mybucket", "present.txt", b"x", ObjectAcl::PublicRead);

    assert!(adapter.is_object_available("present.txt").await.unwrap());
    assert!(!adapter.is_object_available("absent.txt").await.unwrap());

    adapter.s3_service().deny_access.store(true, Ordering::SeqCst);
    assert!(!adapter.is_object_available("present.txt").await.unwrap());
}

#[tokio::test]
async fn object_availability_requires_status_200() {
    let adapter = adapter(&[]);
    let client = adapter.s3_service();
    client.insert("mybucket", "partial.txt", b"x", ObjectAcl::PublicRead);

    client.head_status.store(206, Ordering::SeqCst);
    assert!(!adapter.is_object_available("partial.txt").await.unwrap());

    client.head_status.store(200, Ordering::SeqCst);
    assert!(adapter.is_object_available("partial.txt").await.unwrap());
}

#[tokio::test]
async fn can_store_reflects_bucket_existence() {
    let adapter = adapter(&[]);
    assert!(adapter.can_store().await.unwrap());

    let config = S3AdapterConfig::from_options(&common::options(&[(
        option_keys::BUCKET,
        json!("other-bucket"),
    )]))
    .unwrap();
    let missing = AmazonS3Adapter::with_client(config, MemoryObjectClient::with_bucket("mybucket"));
    assert!(!missing.can_store().await.unwrap());

    adapter.s3_service().deny_access.store(true, Ordering::SeqCst);
    assert!(!adapter.can_store().await.unwrap());
}

#[tokio::test]
async fn end_to_end_public_bucket() {
    let dir = tempdir().unwrap();
    let adapter = adapter(&[]);
    let source = write_source(dir.path(), "a.txt", b"contents");

    adapter.store(&source, "files/a.txt").await.unwrap();
    assert_eq!(
        adapter.get_uri("files/a.txt").await.unwrap(),
        "https://mybucket.s3.amazonaws.com/files/a.txt"
    );
    assert!(adapter.is_object_available("files/a.txt").await.unwrap());
    adapter.delete("files/a.txt").await.unwrap();
    assert!(!adapter.is_object_available("files/a.txt").await.unwrap());
}

#[tokio::test]
async fn end_to_end_private_bucket() {
    let dir = tempdir().unwrap();
    let adapter = adapter(&[(option_keys::EXPIRATION, json!(15))]);
    let source = write_source(dir.path(), "a.txt", b"contents");

    adapter.store(&source, "files/a.txt").await.unwrap();
    assert_eq!(
        adapter.s3_service().object("mybucket", "files/a.txt").unwrap().acl,
        ObjectAcl::Private
    );

    let uri = adapter.get_uri("files/a.txt").await.unwrap();
    assert!(uri.starts_with("https://mybucket.s3.amazonaws.com/files/a.txt?"));
    assert!(uri.contains("X-Amz-Expires=900"));
}

#[tokio::test]
async fn adapter_is_usable_as_trait_object() {
    let adapter: std::sync::Arc<dyn StorageAdapter> = std::sync::Arc::new(adapter(&[]));
    adapter.set_up().await.unwrap();
    assert!(adapter.can_store().await.unwrap());
    assert_eq!(
        adapter.get_uri("x.txt").await.unwrap(),
        "https://mybucket.s3.amazonaws.com/x.txt"
    );
}

#[tokio::test]
async fn concurrent_stores_share_one_adapter() {
    let dir = tempdir().unwrap();
    let adapter = std::sync::Arc::new(adapter(&[]));

    let mut handles = Vec::new();
    for i in 0..8 {
        let adapter = adapter.clone();
        let source = write_source(dir.path(), &format!("{i}.txt"), format!("file {i}").as_bytes());
        handles.push(tokio::spawn(async move {
            adapter.store(&source, &format!("files/{i}.txt")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(adapter.s3_service().object_count(), 8);
    for i in 0..8 {
        assert!(adapter.is_object_available(&format!("files/{i}.txt")).await.unwrap());
    }
}
