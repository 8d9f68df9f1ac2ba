//! Storage adapter trait
//!
//! This module defines the `StorageAdapter` trait that every backend implements,
//! together with the two error kinds adapters report: `ConfigurationError` at
//! construction time and `StorageError` for operations.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Boxed error carried as the cause of a failed remote call
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while constructing an adapter.
///
/// Always fatal to adapter creation; retrying with the same options yields the
/// same error.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Missing AWS credentials: both accessKeyId and secretAccessKey must be specified")]
    MissingCredentials,

    #[error("Missing region: an S3 region name must be specified")]
    MissingRegion,

    #[error("Missing bucket: an S3 bucket name must be specified")]
    MissingBucket,

    #[error("Missing required option: {0}")]
    MissingOption(&'static str),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Invalid option {option}: {reason}")]
    InvalidOption {
        option: &'static str,
        reason: String,
    },

    #[error("Unknown storage adapter: {0}")]
    UnknownAdapter(String),

    #[error("Storage adapter not available: {0}")]
    Unavailable(String),
}

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {key}")]
    NotFound {
        key: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Access denied: {key}")]
    AccessDenied {
        key: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("{operation} failed for {key}: {source}")]
    Remote {
        operation: &'static str,
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("Presigning failed for {key}: {reason}")]
    Presign { key: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn remote(
        operation: &'static str,
        key: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        StorageError::Remote {
            operation,
            key: key.into(),
            source: source.into(),
        }
    }

    /// Missing object with no underlying remote error (local checks, test doubles)
    pub fn not_found(key: impl Into<String>) -> Self {
        StorageError::NotFound {
            key: key.into(),
            source: None,
        }
    }

    pub fn access_denied(key: impl Into<String>) -> Self {
        StorageError::AccessDenied {
            key: key.into(),
            source: None,
        }
    }

    /// True for the "object or bucket is absent / not ours" family that existence
    /// checks translate into `false`.
    pub fn is_not_found_or_forbidden(&self) -> bool {
        matches!(
            self,
            StorageError::NotFound { .. } | StorageError::AccessDenied { .. }
        )
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage adapter trait
///
/// Host code depends only on this trait, never on a concrete adapter. Every
/// implementation is bound to a single location (a bucket, a directory) for its
/// whole lifetime, and each call is an independent operation against it.
///
/// Keys are caller-supplied, opaque, slash-delimited identifiers unique within
/// that location.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// One-time preparation hook run by the host after construction.
    async fn set_up(&self) -> StorageResult<()> {
        Ok(())
    }

    /// Pre-flight capability check: is the backing location present and usable?
    ///
    /// Does not mutate anything. An absent or inaccessible location is `Ok(false)`.
    async fn can_store(&self) -> StorageResult<bool>;

    /// Move a local file into storage under `dest`.
    ///
    /// On success the local file no longer exists. On failure it is left untouched.
    async fn store(&self, source: &Path, dest: &str) -> StorageResult<()>;

    /// Relocate a stored object from `source` to `dest`.
    ///
    /// If the copy step fails the object at `source` is left intact.
    async fn move_object(&self, source: &str, dest: &str) -> StorageResult<()>;

    /// Remove a stored object. Deleting a missing object succeeds.
    async fn delete(&self, path: &str) -> StorageResult<()>;

    /// Resolve a dereferenceable URI for a stored object.
    async fn get_uri(&self, path: &str) -> StorageResult<String>;

    /// Check whether an object exists. A missing object is `Ok(false)`.
    async fn is_object_available(&self, path: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
