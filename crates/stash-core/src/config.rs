//! Configuration module
//!
//! Host-side configuration: reads the process environment (and `.env`) once and
//! turns it into an adapter name plus the options mapping handed to the adapter
//! at construction. Adapters themselves never read the environment.

use std::env;

use serde_json::{Map, Value};

use crate::option_keys;
use crate::storage_types::StorageBackend;

const DEFAULT_BACKEND: StorageBackend = StorageBackend::S3;

/// Adapter selection and options as configured by the host.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub options: Map<String, Value>,
}

impl StorageConfig {
    /// Load configuration from the environment, honouring a `.env` file if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load the options for an explicitly chosen backend, ignoring `STORAGE_ADAPTER`.
    pub fn from_env_for(backend: StorageBackend) -> Self {
        dotenvy::dotenv().ok();
        Self::for_backend(backend, |name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup, selecting the
    /// backend from `STORAGE_ADAPTER`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match first_set(&lookup, &["STORAGE_ADAPTER"]) {
            Some(name) => name.parse()?,
            None => DEFAULT_BACKEND,
        };
        Ok(Self::for_backend(backend, lookup))
    }

    /// Build the options mapping for `backend` from a variable lookup.
    ///
    /// Only variables that are set and non-blank end up in the options mapping;
    /// validating that the required ones are present is the adapter's job.
    pub fn for_backend<F>(backend: StorageBackend, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |names: &[&str]| first_set(&lookup, names);

        let mut options = Map::new();
        let mut set = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                options.insert(key.to_string(), Value::String(value));
            }
        };

        match backend {
            StorageBackend::S3 => {
                set(
                    option_keys::ACCESS_KEY_ID,
                    var(&["S3_ACCESS_KEY_ID", "AWS_ACCESS_KEY_ID"]),
                );
                set(
                    option_keys::SECRET_ACCESS_KEY,
                    var(&["S3_SECRET_ACCESS_KEY", "AWS_SECRET_ACCESS_KEY"]),
                );
                set(option_keys::REGION, var(&["S3_REGION", "AWS_REGION"]));
                set(option_keys::BUCKET, var(&["S3_BUCKET"]));
                set(option_keys::EXPIRATION, var(&["S3_EXPIRATION_MINUTES"]));
                set(option_keys::ENDPOINT, var(&["S3_ENDPOINT"]));
                set(option_keys::TIMEOUT, var(&["S3_TIMEOUT_SECONDS"]));
            }
            StorageBackend::Filesystem => {
                set(option_keys::LOCAL_DIR, var(&["LOCAL_STORAGE_PATH"]));
                set(option_keys::WEB_DIR, var(&["LOCAL_STORAGE_BASE_URL"]));
            }
        }

        StorageConfig { backend, options }
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.backend
    }

    pub fn adapter_options(&self) -> &Map<String, Value> {
        &self.options
    }
}

/// First of `names` that is set to a non-blank value, trimmed.
fn first_set<F>(lookup: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
