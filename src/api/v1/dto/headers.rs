use serde::Serialize;

use crate::headers::SecurityHeader;

#[derive(Debug, Serialize)]
pub struct HeaderPreview {
    pub name: String,
    pub value: String,
    // true when `value` still contains the nonce placeholder
    pub deferred: bool,
}

impl From<SecurityHeader> for HeaderPreview {
    fn from(header: SecurityHeader) -> Self {
        Self {
            deferred: header.is_deferred(),
            name: header.name().to_string(),
            value: header.template().to_string(),
        }
    }
}
