use crate::client::encode_key;
use crate::options::AdapterOptions;
use crate::traits::{ConfigurationError, StorageAdapter, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use stash_core::option_keys;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Local filesystem storage adapter
///
/// Stored files live under `base_path`; URIs are `base_url` joined with the key.
#[derive(Clone, Debug)]
pub struct FilesystemAdapter {
    base_path: PathBuf,
    base_url: String,
}

impl FilesystemAdapter {
    /// Create a new FilesystemAdapter from the `localDir` and `webDir` options
    pub fn new(options: &AdapterOptions) -> Result<Self, ConfigurationError> {
        let base_path = options
            .string(option_keys::LOCAL_DIR)
            .ok_or(ConfigurationError::MissingOption(option_keys::LOCAL_DIR))?;
        let base_url = options
            .string(option_keys::WEB_DIR)
            .ok_or(ConfigurationError::MissingOption(option_keys::WEB_DIR))?;

        Ok(Self::with_paths(base_path, base_url))
    }

    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/stash/files")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/files")
    pub fn with_paths(base_path: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        FilesystemAdapter {
            base_path: base_path.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a storage key to a filesystem path under the base directory.
    ///
    /// Rejects keys that could escape it: absolute paths, `..`, and anything
    /// other than plain path segments.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(format!(
                "Storage key contains invalid characters: {}",
                storage_key
            )));
        }

        let relative = Path::new(storage_key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(format!(
                "Storage key resolves outside storage directory: {}",
                storage_key
            )));
        }

        Ok(self.base_path.join(relative))
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, encode_key(key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for FilesystemAdapter {
    async fn set_up(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    async fn can_store(&self) -> StorageResult<bool> {
        match fs::metadata(&self.base_path).await {
            Ok(meta) => Ok(meta.is_dir() && !meta.permissions().readonly()),
            Err(_) => Ok(false),
        }
    }

    async fn store(&self, source: &Path, dest: &str) -> StorageResult<()> {
        let path = self.key_to_path(dest)?;
        let start = std::time::Instant::now();

        let metadata = fs::metadata(source).await?;
        self.ensure_parent_dir(&path).await?;

        if fs::rename(source, &path).await.is_err() {
            // rename fails across filesystems; fall back to copy then remove
            if let Err(e) = fs::copy(source, &path).await {
                let _ = fs::remove_file(&path).await;
                return Err(StorageError::Io(e));
            }
            fs::remove_file(source).await?;
        }

        tracing::info!(
            source = %source.display(),
            path = %path.display(),
            key = %dest,
            size_bytes = metadata.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Filesystem store successful"
        );

        Ok(())
    }

    async fn move_object(&self, source: &str, dest: &str) -> StorageResult<()> {
        let from_path = self.key_to_path(source)?;
        let to_path = self.key_to_path(dest)?;

        if !fs::try_exists(&from_path).await.unwrap_or(false) {
            return Err(StorageError::not_found(source));
        }

        self.ensure_parent_dir(&to_path).await?;
        fs::rename(&from_path, &to_path).await?;

        tracing::info!(
            from_key = %source,
            to_key = %dest,
            from_path = %from_path.display(),
            to_path = %to_path.display(),
            "Filesystem move successful"
        );

        Ok(())
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        let file = self.key_to_path(path)?;

        if !fs::try_exists(&file).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&file).await?;

        tracing::info!(
            path = %file.display(),
            key = %path,
            "Filesystem delete successful"
        );

        Ok(())
    }

    async fn get_uri(&self, path: &str) -> StorageResult<String> {
        self.key_to_path(path)?;
        Ok(self.generate_url(path))
    }

    async fn is_object_available(&self, path: &str) -> StorageResult<bool> {
        let file = self.key_to_path(path)?;
        Ok(fs::try_exists(&file).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Filesystem
    }
}
