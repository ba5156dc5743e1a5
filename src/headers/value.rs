//! Compiled header: a name plus a value template.
//!
//! Only the Content-Security-Policy template is deferred: the compiler marks
//! the byte offsets where the per-request nonce goes. Everything else is
//! final once compiled, even if an administrator typed a literal `%s`.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// How a nonce slot is displayed in [`SecurityHeader::template`].
pub const NONCE_PLACEHOLDER: &str = "%s";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityHeader {
    name: String,
    template: String,
    /// Offsets of the [`NONCE_PLACEHOLDER`]s written by [`TemplateBuilder::push_nonce`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    nonce_slots: Vec<usize>,
}

impl SecurityHeader {
    /// A header whose value is final. `%s` in `value` is kept verbatim.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        debug_assert!(!name.is_empty(), "header name must not be empty");
        Self {
            name,
            template: value.into(),
            nonce_slots: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn is_deferred(&self) -> bool {
        !self.nonce_slots.is_empty()
    }

    /// Final header value for one response.
    pub fn render(&self, nonce: &str) -> Cow<'_, str> {
        if !self.is_deferred() {
            return Cow::Borrowed(&self.template);
        }

        let mut out =
            String::with_capacity(self.template.len() + nonce.len() * self.nonce_slots.len());
        let mut last = 0;
        for &slot in &self.nonce_slots {
            let end = slot + NONCE_PLACEHOLDER.len();
            let (Some(head), Some(NONCE_PLACEHOLDER)) =
                (self.template.get(last..slot), self.template.get(slot..end))
            else {
                tracing::warn!(
                    header = %self.name,
                    slot,
                    "nonce slot out of place; rendering template as-is"
                );
                return Cow::Borrowed(&self.template);
            };
            out.push_str(head);
            out.push_str(nonce);
            last = end;
        }
        out.push_str(&self.template[last..]);
        Cow::Owned(out)
    }
}

/// Accumulates a header value, recording nonce slots as they are written.
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    template: String,
    nonce_slots: Vec<usize>,
}

impl TemplateBuilder {
    pub fn push_str(&mut self, text: &str) {
        self.template.push_str(text);
    }

    pub fn push_nonce(&mut self) {
        self.nonce_slots.push(self.template.len());
        self.template.push_str(NONCE_PLACEHOLDER);
    }

    pub fn is_empty(&self) -> bool {
        self.template.is_empty()
    }

    pub fn build(self, name: impl Into<String>) -> SecurityHeader {
        let name = name.into();
        debug_assert!(!name.is_empty(), "header name must not be empty");
        SecurityHeader {
            name,
            template: self.template,
            nonce_slots: self.nonce_slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_every_nonce_slot() {
        let mut builder = TemplateBuilder::default();
        builder.push_str("script-src 'nonce-");
        builder.push_nonce();
        builder.push_str("'; style-src 'nonce-");
        builder.push_nonce();
        builder.push_str("';");
        let header = builder.build("Content-Security-Policy");

        assert!(header.is_deferred());
        assert_eq!(
            header.render("abc123"),
            "script-src 'nonce-abc123'; style-src 'nonce-abc123';"
        );
        // The template itself is untouched.
        assert_eq!(
            header.template(),
            "script-src 'nonce-%s'; style-src 'nonce-%s';"
        );
    }

    #[test]
    fn literal_percent_s_outside_a_slot_is_kept() {
        let mut builder = TemplateBuilder::default();
        builder.push_str("img-src https://cdn.example/%s; script-src 'nonce-");
        builder.push_nonce();
        builder.push_str("';");
        let header = builder.build("Content-Security-Policy");

        assert_eq!(
            header.render("abc123"),
            "img-src https://cdn.example/%s; script-src 'nonce-abc123';"
        );
    }

    #[test]
    fn static_headers_never_substitute() {
        let header = SecurityHeader::new("X-Frame-Options", "ALLOW-FROM https://a.example/%s");

        assert!(!header.is_deferred());
        assert!(matches!(
            header.render("ignored"),
            Cow::Borrowed("ALLOW-FROM https://a.example/%s")
        ));
    }

    #[test]
    fn nonce_slots_survive_the_cache_encoding() {
        let mut builder = TemplateBuilder::default();
        builder.push_str("default-src https://x.example/%s 'nonce-");
        builder.push_nonce();
        builder.push_str("';");
        let header = builder.build("Content-Security-Policy");

        let raw = serde_json::to_string(&header).expect("serialize");
        let back: SecurityHeader = serde_json::from_str(&raw).expect("deserialize");

        assert_eq!(back, header);
        assert_eq!(
            back.render("n0"),
            "default-src https://x.example/%s 'nonce-n0';"
        );
    }

    #[test]
    fn absent_header_serializes_as_null() {
        let absent: Option<SecurityHeader> = None;
        let raw = serde_json::to_string(&absent).expect("serialize");
        assert_eq!(raw, "null");

        let back: Option<SecurityHeader> = serde_json::from_str(&raw).expect("deserialize");
        assert_eq!(back, None);
    }
}
