//! In-memory `ObjectClient` used by the adapter integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use stash_core::option_keys;
use stash_storage::{
    AdapterOptions, AmazonS3Adapter, HeadObject, ObjectAcl, ObjectClient, PresignOperation,
    S3AdapterConfig, StorageError, StorageResult,
};
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub acl: ObjectAcl,
}

/// Bucket contents keyed by (bucket, key), with switchable failure injection
#[derive(Default)]
pub struct MemoryObjectClient {
    buckets: Vec<String>,
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    pub fail_puts: AtomicBool,
    pub fail_copies: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub deny_access: AtomicBool,
    /// Status reported by `head_object` for objects that exist
    pub head_status: AtomicU16,
}

impl MemoryObjectClient {
    pub fn with_bucket(bucket: &str) -> Self {
        MemoryObjectClient {
            buckets: vec![bucket.to_string()],
            head_status: AtomicU16::new(200),
            ..Default::default()
        }
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn insert(&self, bucket: &str, key: &str, data: &[u8], acl: ObjectAcl) {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data: data.to_vec(),
                acl,
            },
        );
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    fn check_access(&self, key: &str) -> StorageResult<()> {
        if self.deny_access.load(Ordering::SeqCst) {
            return Err(StorageError::AccessDenied {
                key: key.to_string(),
                source: Some(Box::new(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "simulated 403 Forbidden",
                ))),
            });
        }
        Ok(())
    }

    fn injected(operation: &'static str, key: &str) -> StorageError {
        StorageError::remote(
            operation,
            key,
            io::Error::new(io::ErrorKind::ConnectionReset, "simulated network failure"),
        )
    }
}

#[async_trait]
impl ObjectClient for MemoryObjectClient {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        self.check_access(bucket)?;
        Ok(self.buckets.iter().any(|b| b == bucket))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
        acl: ObjectAcl,
    ) -> StorageResult<String> {
        self.check_access(key)?;
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Self::injected("PutObject", key));
        }
        let data = tokio::fs::read(source).await?;
        self.insert(bucket, key, &data, acl);
        Ok(self.public_url(bucket, key))
    }

    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
        acl: ObjectAcl,
    ) -> StorageResult<String> {
        self.check_access(src_key)?;
        if self.fail_copies.load(Ordering::SeqCst) {
            return Err(Self::injected("CopyObject", src_key));
        }
        let source = self
            .object(src_bucket, src_key)
            .ok_or_else(|| StorageError::not_found(src_key))?;
        self.insert(dst_bucket, dst_key, &source.data, acl);
        Ok(self.public_url(dst_bucket, dst_key))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.check_access(key)?;
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::injected("DeleteObject", key));
        }
        self.objects
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> StorageResult<HeadObject> {
        self.check_access(key)?;
        let object = self
            .object(bucket, key)
            .ok_or_else(|| StorageError::not_found(key))?;
        Ok(HeadObject {
            status_code: self.head_status.load(Ordering::SeqCst),
            content_length: Some(object.data.len() as u64),
            ..Default::default()
        })
    }

    async fn presigned_url(
        &self,
        _operation: PresignOperation,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> StorageResult<String> {
        let now = chrono::Utc::now();
        Ok(format!(
            "{}?X-Amz-Date={}&X-Amz-Expires={}&X-Amz-Signature={:x}",
            self.public_url(bucket, key),
            now.format("%Y%m%dT%H%M%S%.9fZ"),
            ttl.as_secs(),
            now.timestamp_nanos_opt().unwrap_or_default()
        ))
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("https://{}.s3.amazonaws.com/{}", bucket, key)
    }
}

pub fn options(extra: &[(&str, serde_json::Value)]) -> AdapterOptions {
    let mut options = AdapterOptions::new()
        .with(option_keys::ACCESS_KEY_ID, "AK")
        .with(option_keys::SECRET_ACCESS_KEY, "SK")
        .with(option_keys::REGION, "us-east-1")
        .with(option_keys::BUCKET, "mybucket");
    for (key, value) in extra {
        options = options.with(*key, value.clone());
    }
    options
}

pub fn adapter(extra: &[(&str, serde_json::Value)]) -> AmazonS3Adapter<MemoryObjectClient> {
    let config = S3AdapterConfig::from_options(&options(extra)).unwrap();
    AmazonS3Adapter::with_client(config, MemoryObjectClient::with_bucket("mybucket"))
}
