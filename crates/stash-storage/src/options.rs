//! Adapter construction options.
//!
//! Hosts hand adapters a string-keyed mapping of scalar values. The mapping is
//! immutable once built; adapters validate it into their own typed config.

use serde_json::{Map, Value};

/// Options mapping supplied once at adapter construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdapterOptions(Map<String, Value>);

impl AdapterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// A string option. Numbers are rendered as strings; null, booleans, arrays,
    /// objects and blank strings count as absent.
    pub fn string(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// An integer option with lenient coercion; anything unparseable is 0.
    pub fn integer(&self, key: &str) -> i64 {
        self.0.get(key).map(coerce_integer).unwrap_or(0)
    }
}

impl From<Map<String, Value>> for AdapterOptions {
    fn from(map: Map<String, Value>) -> Self {
        AdapterOptions(map)
    }
}

impl<K, V> FromIterator<(K, V)> for AdapterOptions
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        AdapterOptions(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Integer-cast coercion: integers as-is, floats truncated, strings read from
/// their leading (optionally signed) digit run, `true` as 1, everything else 0.
fn coerce_integer(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => leading_integer(s),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn leading_integer(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    if negative {
        -value
    } else {
        value
    }
}
