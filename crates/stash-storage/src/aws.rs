//! `ObjectClient` backed by aws-sdk-s3.

use crate::client::{encode_key, HeadObject, ObjectClient, PresignOperation};
use crate::policy::ObjectAcl;
use crate::s3::S3AdapterConfig;
use crate::traits::{StorageError, StorageResult};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use std::path::Path;
use std::time::Duration;

const US_EAST_1: &str = "us-east-1";
const CREDENTIALS_SOURCE: &str = "stash-adapter-options";

/// aws-sdk-s3 client bound to one region and credential pair
#[derive(Clone, Debug)]
pub struct AwsS3Client {
    client: Client,
    region: String,
    endpoint_url: Option<String>,
}

impl AwsS3Client {
    /// Build the SDK client from a validated configuration.
    ///
    /// Credentials are handed to the SDK directly. SDK retries are disabled so a
    /// transient failure reaches the caller on the first attempt.
    pub async fn connect(config: &S3AdapterConfig) -> Self {
        let credentials = Credentials::new(
            config.credentials().access_key_id.clone(),
            config.credentials().secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_SOURCE,
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region().to_string()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled());

        if let Some(timeout) = config.timeout() {
            loader = loader.timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(timeout)
                    .build(),
            );
        }

        let sdk_config = loader.load().await;

        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = config.endpoint() {
            // S3-compatible providers (MinIO etc.) need path-style addressing
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        AwsS3Client {
            client: Client::from_conf(s3_config_builder.build()),
            region: config.region().to_string(),
            endpoint_url: config.endpoint().map(String::from),
        }
    }

    /// The raw SDK client
    pub fn sdk_client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ObjectClient for AwsS3Client {
    async fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => match classify("HeadBucket", bucket, e) {
                err if err.is_not_found_or_forbidden() => Ok(false),
                err => Err(err),
            },
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        source: &Path,
        acl: ObjectAcl,
    ) -> StorageResult<String> {
        let body = ByteStream::from_path(source)
            .await
            .map_err(|e| StorageError::remote("PutObject", key, e))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .acl(canned_acl(acl))
            .body(body)
            .send()
            .await
            .map_err(|e| classify("PutObject", key, e))?;

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
        // The copy source must be URL-encoded per the S3 API
        let copy_source = format!("{}/{}", src_bucket, encode_key(src_key));

        self.client
            .copy_object()
            .bucket(dst_bucket)
            .key(dst_key)
            .copy_source(copy_source)
            .acl(canned_acl(acl))
            .send()
            .await
            .map_err(|e| classify("CopyObject", src_key, e))?;

        Ok(self.public_url(dst_bucket, dst_key))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify("DeleteObject", key, e))?;
        Ok(())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> StorageResult<HeadObject> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify("HeadObject", key, e))?;

        // The SDK only yields Ok for a successful response, and HEAD answers 200.
        Ok(HeadObject {
            status_code: 200,
            content_length: output.content_length().and_then(|l| u64::try_from(l).ok()),
            content_type: output.content_type().map(String::from),
            e_tag: output.e_tag().map(String::from),
        })
    }

    async fn presigned_url(
        &self,
        operation: PresignOperation,
        bucket: &str,
        key: &str,
        ttl: Duration,
    ) -> StorageResult<String> {
        let presigning_config =
            PresigningConfig::expires_in(ttl).map_err(|e| StorageError::Presign {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        let presigned_request = match operation {
            PresignOperation::GetObject => self
                .client
                .get_object()
                .bucket(bucket)
                .key(key)
                .presigned(presigning_config)
                .await
                .map_err(|e| StorageError::Presign {
                    key: key.to_string(),
                    reason: DisplayErrorContext(&e).to_string(),
                })?,
        };

        Ok(presigned_request.uri().to_string())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        public_object_url(&self.region, self.endpoint_url.as_deref(), bucket, key)
    }
}

fn canned_acl(acl: ObjectAcl) -> ObjectCannedAcl {
    match acl {
        ObjectAcl::PublicRead => ObjectCannedAcl::PublicRead,
        ObjectAcl::Private => ObjectCannedAcl::Private,
    }
}

/// Canonical unsigned URL for an object.
///
/// Virtual-hosted style on AWS (`us-east-1` uses the global host), path style
/// for bucket names containing dots and for custom endpoints.
pub(crate) fn public_object_url(
    region: &str,
    endpoint: Option<&str>,
    bucket: &str,
    key: &str,
) -> String {
    let key = encode_key(key);

    if let Some(endpoint) = endpoint {
        return format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key);
    }

    let host = if region == US_EAST_1 {
        "s3.amazonaws.com".to_string()
    } else {
        format!("s3.{}.amazonaws.com", region)
    };

    if bucket.contains('.') {
        format!("https://{}/{}/{}", host, bucket, key)
    } else {
        format!("https://{}.{}/{}", bucket, host, key)
    }
}

/// Map an SDK failure onto the storage error kinds.
fn classify<E>(operation: &'static str, key: &str, err: SdkError<E, HttpResponse>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let code = err.as_service_error().and_then(|e| e.code()).map(String::from);

    match (status, code.as_deref()) {
        (_, Some("NoSuchBucket")) => {}
        (Some(404), _) | (_, Some("NoSuchKey" | "NotFound")) => {
            tracing::debug!(operation = operation, key = %key, "S3 object not found");
            return StorageError::NotFound {
                key: key.to_string(),
                source: Some(Box::new(err)),
            };
        }
        (Some(403), _) | (_, Some("AccessDenied" | "Forbidden")) => {
            tracing::warn!(
                error = %DisplayErrorContext(&err),
                operation = operation,
                key = %key,
                "S3 access denied"
            );
            return StorageError::AccessDenied {
                key: key.to_string(),
                source: Some(Box::new(err)),
            };
        }
        _ => {}
    }

    tracing::error!(
        error = %DisplayErrorContext(&err),
        operation = operation,
        key = %key,
        status = ?status,
        "S3 request failed"
    );
    StorageError::remote(operation, key, err)
}
