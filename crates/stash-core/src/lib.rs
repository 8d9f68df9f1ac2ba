//! Stash Core Library
//!
//! Shared types for the stash storage adapters: the backend enum, the option
//! names adapters understand, and the env-driven host configuration.

pub mod config;
pub mod option_keys;
pub mod storage_types;

// Re-export commonly used types
pub use config::StorageConfig;
pub use storage_types::StorageBackend;
