/*
 * Responsibility
 * - Administrator settings as seen by the header compilers (group -> key -> value)
 * - The store itself is a collaborator: compilers only read through `SettingsStore`
 * - Persistence (file load, save via admin API) lives in `memory`
 */
pub mod memory;
pub mod view;

pub use memory::MemorySettings;
pub use view::Settings;

use serde_json::Value;
use thiserror::Error;

/// Read-only access to settings, indexed by setting group and key.
///
/// Missing groups and keys are `None`; callers treat that as "disabled".
pub trait SettingsStore: Send + Sync {
    fn get(&self, group: &str, key: &str) -> Option<Value>;
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("settings group `{0}` must be a JSON object")]
    NotAnObject(String),
}
