//! Typed, total accessors over a [`SettingsStore`].
//!
//! Settings are written by an admin UI, so values arrive loosely typed
//! (`true`, `1`, `"1"`, `"on"` all mean enabled). Every accessor here
//! degrades a wrong type to "absent" instead of failing.

use serde_json::{Map, Value};

use super::SettingsStore;

#[derive(Clone, Copy)]
pub struct Settings<'a> {
    store: &'a dyn SettingsStore,
}

impl<'a> Settings<'a> {
    pub fn new(store: &'a dyn SettingsStore) -> Self {
        Self { store }
    }

    /// Raw value, `None` when missing or explicitly `null`.
    pub fn value(&self, group: &str, key: &str) -> Option<Value> {
        self.store.get(group, key).filter(|v| !v.is_null())
    }

    pub fn flag(&self, group: &str, key: &str) -> bool {
        self.value(group, key).is_some_and(|v| truthy(&v))
    }

    /// Trimmed string value; empty strings read as `None`.
    pub fn text(&self, group: &str, key: &str) -> Option<String> {
        match self.value(group, key)? {
            Value::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            _ => None,
        }
    }

    /// Object-shaped entry (CSP directive, feature allow-list, ...).
    pub fn entry(&self, group: &str, key: &str) -> Option<Map<String, Value>> {
        match self.value(group, key)? {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// See [`list_of`].
    pub fn list(&self, group: &str, key: &str, field: &str) -> Vec<String> {
        self.value(group, key)
            .map(|v| list_of(&v, field))
            .unwrap_or_default()
    }
}

pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        ),
        _ => false,
    }
}

/// Non-negative integer from a JSON number or a numeric string.
pub fn as_integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Flatten a list setting into its string items.
///
/// Items may be plain strings or table rows such as `{"value": "..."}`;
/// for rows, `field` names the column to read. Blank items are dropped and
/// order is preserved.
pub fn list_of(value: &Value, field: &str) -> Vec<String> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.as_str()),
            Value::Object(row) => row.get(field).and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
