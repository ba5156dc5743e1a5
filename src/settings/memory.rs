//! In-process settings store.
//!
//! Groups are loaded once from a JSON file at startup and replaced whole
//! when the admin API saves a group. Readers never observe a half-written
//! group: `replace_group` swaps the map in one insert.

use std::path::Path;

use dashmap::DashMap;
use serde_json::{Map, Value};

use super::{SettingsError, SettingsStore};

#[derive(Debug, Default)]
pub struct MemorySettings {
    groups: DashMap<String, Map<String, Value>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a top-level object of `{ "<group>": { "<key>": value } }`.
    pub fn from_value(value: Value) -> Result<Self, SettingsError> {
        let Value::Object(groups) = value else {
            return Err(SettingsError::NotAnObject("<root>".to_string()));
        };

        let settings = Self::new();
        for (group, entries) in groups {
            match entries {
                Value::Object(map) => settings.replace_group(&group, map),
                _ => return Err(SettingsError::NotAnObject(group)),
            }
        }
        Ok(settings)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let value: Value = serde_json::from_str(&raw)?;
        let settings = Self::from_value(value)?;

        tracing::info!(
            path = %path.as_ref().display(),
            groups = settings.groups.len(),
            "loaded settings"
        );
        Ok(settings)
    }

    pub fn replace_group(&self, group: &str, entries: Map<String, Value>) {
        self.groups.insert(group.to_string(), entries);
    }

    /// Snapshot of one group, for display.
    pub fn group(&self, group: &str) -> Option<Map<String, Value>> {
        self.groups.get(group).map(|g| g.value().clone())
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, group: &str, key: &str) -> Option<Value> {
        self.groups.get(group)?.get(key).cloned()
    }
}
