//! Stash CLI: drive a storage adapter from the command line.
//!
//! Adapter selection and options come from the environment (see
//! `stash_core::StorageConfig`); `--adapter` and `-o key=value` override them.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use stash_cli::{init_tracing, merge_options, parse_option};
use stash_core::{StorageBackend, StorageConfig};
use stash_storage::{create_adapter, AdapterOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stash", about = "Store, move and resolve files through a storage adapter")]
struct Cli {
    /// Adapter name (s3, filesystem); defaults to STORAGE_ADAPTER
    #[arg(long, global = true)]
    adapter: Option<String>,

    /// Option override as key=value (e.g. -o expiration=15); repeatable
    #[arg(short = 'o', long = "option", global = true, value_parser = parse_option)]
    options: Vec<(String, Value)>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the configured location is usable
    CanStore,
    /// Move a local file into storage
    Store {
        /// Local file; removed once stored
        source: PathBuf,
        /// Destination key
        dest: String,
    },
    /// Relocate a stored object
    Move {
        source: String,
        dest: String,
    },
    /// Delete a stored object (succeeds if it is already gone)
    Delete {
        key: String,
    },
    /// Print a URI for a stored object
    Uri {
        key: String,
    },
    /// Check whether a stored object exists
    Exists {
        key: String,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    // --adapter decides which backend's variables are read, so STORAGE_ADAPTER is not consulted.
    let config = match cli.adapter.as_deref() {
        Some(name) => {
            let backend: StorageBackend = name.parse()?;
            StorageConfig::from_env_for(backend)
        }
        None => StorageConfig::from_env().context("Failed to load storage configuration")?,
    };

    let adapter_name = config.storage_backend().to_string();
    let options = AdapterOptions::from(merge_options(config.options, cli.options));

    let adapter = create_adapter(&adapter_name, &options)
        .await
        .with_context(|| format!("Failed to create {} storage adapter", adapter_name))?;
    adapter.set_up().await.context("Storage adapter set-up failed")?;

    match cli.command {
        Commands::CanStore => {
            let can_store = adapter.can_store().await?;
            print_json(&serde_json::json!({ "can_store": can_store }))?;
        }
        Commands::Store { source, dest } => {
            adapter.store(&source, &dest).await?;
            let uri = adapter.get_uri(&dest).await?;
            print_json(&serde_json::json!({ "stored": dest, "uri": uri }))?;
        }
        Commands::Move { source, dest } => {
            adapter.move_object(&source, &dest).await?;
            print_json(&serde_json::json!({ "moved": source, "to": dest }))?;
        }
        Commands::Delete { key } => {
            adapter.delete(&key).await?;
            print_json(&serde_json::json!({ "deleted": key }))?;
        }
        Commands::Uri { key } => {
            let uri = adapter.get_uri(&key).await?;
            print_json(&serde_json::json!({ "key": key, "uri": uri }))?;
        }
        Commands::Exists { key } => {
            let available = adapter.is_object_available(&key).await?;
            print_json(&serde_json::json!({ "key": key, "available": available }))?;
        }
    }

    Ok(())
}
