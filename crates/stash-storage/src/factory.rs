#[cfg(feature = "storage-filesystem")]
use crate::FilesystemAdapter;
#[cfg(feature = "storage-s3")]
use crate::AmazonS3Adapter;
use crate::{AdapterOptions, ConfigurationError, StorageAdapter, StorageBackend};
use stash_core::StorageConfig;
use std::sync::Arc;

/// Create a storage adapter by name with an options mapping.
///
/// `name` is any spelling `StorageBackend` accepts ("s3", "AmazonS3",
/// "filesystem", "local").
pub async fn create_adapter(
    name: &str,
    options: &AdapterOptions,
) -> Result<Arc<dyn StorageAdapter>, ConfigurationError> {
    let backend: StorageBackend = name
        .parse()
        .map_err(|_| ConfigurationError::UnknownAdapter(name.to_string()))?;

    create_backend(backend, options).await
}

/// Create the adapter the host configuration selects.
pub async fn create_adapter_from_config(
    config: &StorageConfig,
) -> Result<Arc<dyn StorageAdapter>, ConfigurationError> {
    let options = AdapterOptions::from(config.adapter_options().clone());
    create_backend(config.storage_backend(), &options).await
}

async fn create_backend(
    backend: StorageBackend,
    options: &AdapterOptions,
) -> Result<Arc<dyn StorageAdapter>, ConfigurationError> {
    match backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let adapter = AmazonS3Adapter::new(options).await?;
            Ok(Arc::new(adapter))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(ConfigurationError::Unavailable(
            "S3 storage adapter not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-filesystem")]
        StorageBackend::Filesystem => {
            let adapter = FilesystemAdapter::new(options)?;
            Ok(Arc::new(adapter))
        }

        #[cfg(not(feature = "storage-filesystem"))]
        StorageBackend::Filesystem => Err(ConfigurationError::Unavailable(
            "Filesystem storage adapter not available (storage-filesystem feature not enabled)"
                .to_string(),
        )),
    }
}
