//! Stash Storage Library
//!
//! Pluggable file storage: host code stores, moves, deletes and resolves URIs
//! for opaque files through the `StorageAdapter` trait without knowing which
//! backend holds them.
//!
//! # Backends
//!
//! - **S3** (`AmazonS3Adapter`): one bucket per adapter. Objects are written
//!   `public-read` and addressed by their canonical URL, unless an `expiration`
//!   (minutes) is configured; then they are `private` and every URI is a fresh
//!   presigned URL valid for that long.
//! - **Filesystem** (`FilesystemAdapter`): one directory per adapter, served
//!   from a base URL.
//!
//! Adapters are built from an `AdapterOptions` mapping, either directly or by
//! name through `create_adapter`. Construction fails with `ConfigurationError`
//! before anything remote is touched; operations fail with `StorageError`.

pub mod client;
pub mod factory;
#[cfg(feature = "storage-filesystem")]
pub mod filesystem;
pub mod options;
pub mod policy;
pub mod traits;

#[cfg(feature = "storage-s3")]
pub mod aws;
#[cfg(feature = "storage-s3")]
pub mod s3;

// Re-export commonly used types
pub use client::{HeadObject, ObjectClient, PresignOperation};
pub use factory::{create_adapter, create_adapter_from_config};
#[cfg(feature = "storage-filesystem")]
pub use filesystem::FilesystemAdapter;
pub use options::AdapterOptions;
pub use policy::{AccessPolicy, ObjectAcl};
pub use stash_core::StorageBackend;
pub use traits::{
    BoxError, ConfigurationError, StorageAdapter, StorageError, StorageResult,
};
#[cfg(feature = "storage-s3")]
pub use aws::AwsS3Client;
#[cfg(feature = "storage-s3")]
pub use s3::{AmazonS3Adapter, Credentials, S3AdapterConfig};
