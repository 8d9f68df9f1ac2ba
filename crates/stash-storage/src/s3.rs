use crate::aws::AwsS3Client;
use crate::client::{ObjectClient, PresignOperation};
use crate::options::AdapterOptions;
use crate::policy::{AccessPolicy, ObjectAcl};
use crate::traits::{ConfigurationError, StorageAdapter, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use stash_core::option_keys;
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::fs;

/// Static credential pair for the object store
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Validated S3 adapter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3AdapterConfig {
    credentials: Credentials,
    region: String,
    bucket: String,
    expiration_minutes: u32,
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl S3AdapterConfig {
    /// Validate an options mapping.
    ///
    /// Nothing remote is contacted. Credentials are checked first, then region,
    /// then bucket; the first problem found is reported.
    pub fn from_options(options: &AdapterOptions) -> Result<Self, ConfigurationError> {
        let credentials = match (
            options.string(option_keys::ACCESS_KEY_ID),
            options.string(option_keys::SECRET_ACCESS_KEY),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Credentials {
                access_key_id,
                secret_access_key,
            },
            _ => return Err(ConfigurationError::MissingCredentials),
        };

        let region = options
            .string(option_keys::REGION)
            .ok_or(ConfigurationError::MissingRegion)?;
        let region = region.trim().to_string();
        if !is_valid_region(&region) {
            return Err(ConfigurationError::InvalidRegion(region));
        }

        let bucket = options
            .string(option_keys::BUCKET)
            .map(|b| b.trim().to_string())
            .ok_or(ConfigurationError::MissingBucket)?;

        let expiration_minutes =
            u32::try_from(options.integer(option_keys::EXPIRATION).max(0)).unwrap_or(u32::MAX);

        let endpoint = match options.string(option_keys::ENDPOINT) {
            Some(endpoint) => {
                let endpoint = endpoint.trim().trim_end_matches('/').to_string();
                if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                    return Err(ConfigurationError::InvalidOption {
                        option: option_keys::ENDPOINT,
                        reason: format!("expected an http(s) URL, got {}", endpoint),
                    });
                }
                Some(endpoint)
            }
            None => None,
        };

        let timeout = match options.integer(option_keys::TIMEOUT) {
            secs if secs > 0 => Some(Duration::from_secs(secs as u64)),
            _ => None,
        };

        Ok(S3AdapterConfig {
            credentials,
            region,
            bucket,
            expiration_minutes,
            endpoint,
            timeout,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Custom endpoint for S3-compatible providers (MinIO, Spaces, ...)
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Expiration in minutes; 0 means objects are public and never expire
    pub fn expiration(&self) -> u32 {
        self.access_policy().expiration()
    }

    pub fn acl(&self) -> ObjectAcl {
        self.access_policy().acl()
    }

    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::from_expiration(self.expiration_minutes)
    }
}

/// Region names are lowercase alphanumerics separated by single hyphens.
fn is_valid_region(region: &str) -> bool {
    !region.is_empty()
        && region
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !region.starts_with('-')
        && !region.ends_with('-')
        && !region.contains("--")
}

/// Storage adapter for S3 and S3-compatible object stores
///
/// Bound to one bucket, region and credential pair for its lifetime. Objects
/// are written public-read unless an expiration is configured, in which case
/// they are private and URIs are presigned.
pub struct AmazonS3Adapter<C = AwsS3Client> {
    config: S3AdapterConfig,
    client: C,
}

impl AmazonS3Adapter<AwsS3Client> {
    /// Validate `options` and bind an aws-sdk-s3 client to them.
    ///
    /// The credentials go straight into the client; the process environment is
    /// not modified.
    pub async fn new(options: &AdapterOptions) -> Result<Self, ConfigurationError> {
        let config = S3AdapterConfig::from_options(options)?;
        let client = AwsS3Client::connect(&config).await;

        tracing::debug!(
            bucket = %config.bucket(),
            region = %config.region(),
            expiration_minutes = config.expiration(),
            "S3 storage adapter configured"
        );

        Ok(Self::with_client(config, client))
    }
}

impl<C: ObjectClient> AmazonS3Adapter<C> {
    pub fn with_client(config: S3AdapterConfig, client: C) -> Self {
        AmazonS3Adapter { config, client }
    }

    pub fn config(&self) -> &S3AdapterConfig {
        &self.config
    }

    pub fn bucket(&self) -> &str {
        self.config.bucket()
    }

    pub fn expiration(&self) -> u32 {
        self.config.expiration()
    }

    pub fn acl(&self) -> ObjectAcl {
        self.config.acl()
    }

    /// Escape hatch: the underlying object client.
    ///
    /// Lets hosts issue requests the adapter contract does not cover. Anything
    /// done through it bypasses the adapter's ACL policy.
    pub fn s3_service(&self) -> &C {
        &self.client
    }
}

#[async_trait]
impl<C: ObjectClient> StorageAdapter for AmazonS3Adapter<C> {
    async fn can_store(&self) -> StorageResult<bool> {
        match self.client.bucket_exists(self.bucket()).await {
            Ok(exists) => Ok(exists),
            Err(e) if e.is_not_found_or_forbidden() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn store(&self, source: &Path, dest: &str) -> StorageResult<()> {
        let start = Instant::now();
        let acl = self.acl();

        let metadata = fs::metadata(source).await?;
        if !metadata.is_file() {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", source.display()),
            )));
        }

        let object_url = self
            .client
            .put_object(self.bucket(), dest, source, acl)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket(),
                    key = %dest,
                    source = %source.display(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 store failed"
                );
                e
            })?;

        // Only reached once the upload is confirmed.
        fs::remove_file(source).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket(),
                key = %dest,
                source = %source.display(),
                "S3 store uploaded object but could not remove local file"
            );
            StorageError::Io(e)
        })?;

        tracing::info!(
            bucket = %self.bucket(),
            key = %dest,
            source = %source.display(),
            acl = %acl,
            object_url = %object_url,
            size_bytes = metadata.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 store successful"
        );

        Ok(())
    }

    async fn move_object(&self, source: &str, dest: &str) -> StorageResult<()> {
        let start = Instant::now();
        let bucket = self.bucket();
        let acl = self.acl();

        // Copy-then-delete onto the same key would remove the only copy.
        if source == dest {
            self.client.head_object(bucket, source).await?;
            tracing::debug!(bucket = %bucket, key = %source, "S3 move onto itself skipped");
            return Ok(());
        }

        let object_url = self
            .client
            .copy_object(bucket, source, bucket, dest, acl)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    from_key = %source,
                    to_key = %dest,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 move failed during copy"
                );
                e
            })?;

        self.delete(source).await?;

        tracing::info!(
            bucket = %bucket,
            from_key = %source,
            to_key = %dest,
            acl = %acl,
            object_url = %object_url,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 move successful"
        );

        Ok(())
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        let start = Instant::now();

        match self.client.delete_object(self.bucket(), path).await {
            Ok(()) | Err(StorageError::NotFound { .. }) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket(),
                    key = %path,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(e);
            }
        }

        tracing::info!(
            bucket = %self.bucket(),
            key = %path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn get_uri(&self, path: &str) -> StorageResult<String> {
        match self.config.access_policy().url_ttl() {
            Some(ttl) => {
                let uri = self
                    .client
                    .presigned_url(PresignOperation::GetObject, self.bucket(), path, ttl)
                    .await?;
                tracing::debug!(
                    bucket = %self.bucket(),
                    key = %path,
                    expiration_minutes = self.expiration(),
                    uri = %uri,
                    "Generated presigned S3 URI"
                );
                Ok(uri)
            }
            None => Ok(self.client.public_url(self.bucket(), path)),
        }
    }

    async fn is_object_available(&self, path: &str) -> StorageResult<bool> {
        match self.client.head_object(self.bucket(), path).await {
            Ok(head) => Ok(head.status_code == 200),
            Err(e) if e.is_not_found_or_forbidden() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
