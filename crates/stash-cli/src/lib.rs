use anyhow::Context;
use serde_json::{Map, Value};

/// Parse a `key=value` option override.
///
/// Values that are plain integers become JSON numbers so they read the same as
/// options coming from a typed host mapping.
pub fn parse_option(s: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = s
        .split_once('=')
        .with_context(|| format!("expected key=value, got {:?}", s))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("option key must not be empty in {:?}", s);
    }
    let value = match value.trim().parse::<i64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::String(value.to_string()),
    };
    Ok((key.to_string(), value))
}

/// Apply command-line overrides on top of the configured options.
pub fn merge_options(
    mut base: Map<String, Value>,
    overrides: Vec<(String, Value)>,
) -> Map<String, Value> {
    for (key, value) in overrides {
        base.insert(key, value);
    }
    base
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
