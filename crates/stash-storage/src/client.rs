//! Remote object-storage client interface.
//!
//! The S3 adapter talks to its backend only through `ObjectClient`, so the
//! request/response protocol stays behind this seam. `AwsS3Client` is the
//! production implementation.

use crate::policy::ObjectAcl;
use crate::traits::StorageResult;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Metadata returned by a head request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadObject {
    pub status_code: u16,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub e_tag: Option<String>,
}

/// Operation a presigned URL grants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresignOperation {
    GetObject,
}

/// Black-box object storage client
///
/// Implementations map "no such object" to `StorageError::NotFound` and
/// authorization failures to `StorageError::AccessDenied`; everything else is a
/// `StorageError::Remote` carrying the cause. None of the calls retry.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Whether the bucket exists and is reachable with our credentials
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;

    /// Upload the local file at `source`, returning the object URL
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
        acl: ObjectAcl,
    ) -> StorageResult<String>;

    /// Server-side copy, returning the destination object URL
    async fn copy_object(
        &self,
        src_bucket: &str,
        src_key: &str,
        dst_bucket: &str,
        dst_key: &str,
        acl: ObjectAcl,
    ) -> StorageResult<String>;

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()>;

    async fn head_object(&self, bucket: &str, key: &str) -> StorageResult<HeadObject>;

    /// Signed URL valid for `ttl` from now
    async fn presigned_url(
        &self,
        operation: PresignOperation,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> StorageResult<String>;

    /// Canonical unsigned object URL
    fn public_url(&self, bucket: &str, key: &str) -> String;
}

/// Percent-encode each segment of a key, keeping `/` separators.
pub(crate) fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
