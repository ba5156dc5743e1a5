/*
 * Responsibility
 * - settings save request validation / response
 */
use serde::Serialize;

/// Group names are identifiers like `csp` or `permissionsPolicy`.
pub fn validate_group_name(group: &str) -> Result<(), &'static str> {
    if group.is_empty() || group.len() > 64 {
        return Err("group must be 1..=64 chars");
    }
    if !group.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("group must be alphanumeric");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct SaveGroupResponse {
    pub group: String,
    // cache keys of the header families that will be recompiled
    pub invalidated: Vec<&'static str>,
}
