//! Content-Security-Policy compiler.
//!
//! Settings layout (group `csp`):
//! - one entry per source-based directive, keyed by the directive name with
//!   `_` for `-` (`default_src`, `base_uri`, ...). An entry is an object of
//!   checkbox keywords (`"self": true`, `"unsafe_inline": true`), the
//!   special `nonce_source` flag, and `_user_sources` (rows of `{value}`).
//! - `plugin_types`, `sandbox`: lists.
//! - `upgrade_insecure_requests`, `block_all_mixed_content`, `report_only`,
//!   `log_violations`: flags.

use serde_json::{Map, Value};

use super::{
    report::{ReportAction, ReportEndpoints},
    value::{SecurityHeader, TemplateBuilder},
};
use crate::settings::{
    Settings,
    view::{list_of, truthy},
};

pub const HEADER: &str = "Content-Security-Policy";
pub const HEADER_REPORT_ONLY: &str = "Content-Security-Policy-Report-Only";

/// Report-To group name shared with the `Report-To` header.
pub const REPORT_GROUP: &str = "csp-endpoint";

const GROUP: &str = "csp";
const NONCE_KEY: &str = "nonce_source";
const USER_SOURCES_KEY: &str = "_user_sources";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Document,
    Fetch,
    Navigation,
}

#[derive(Debug, Clone, Copy)]
pub struct DirectiveDescriptor {
    pub name: &'static str,
    pub kind: DirectiveKind,
}

impl DirectiveDescriptor {
    const fn new(name: &'static str, kind: DirectiveKind) -> Self {
        Self { name, kind }
    }

    /// Settings key for this directive.
    pub fn key(&self) -> String {
        self.name.replace('-', "_")
    }
}

/// Source-based directives in output order: `base-uri`, fetch, navigation.
pub static CSP_DIRECTIVES: &[DirectiveDescriptor] = &[
    DirectiveDescriptor::new("base-uri", DirectiveKind::Document),
    DirectiveDescriptor::new("default-src", DirectiveKind::Fetch),
    DirectiveDescriptor::new("child-src", DirectiveKind::Fetch),
    DirectiveDescriptor::new("connect-src", DirectiveKind::Fetch),
    DirectiveDescriptor::new("font-src", DirectiveKind::Fetch),
    DirectiveDescriptor::new("frame-src", DirectiveKind::Fetch),
    DirectiveDescriptor::new("img-src", DirectiveKind::Fetch),
    DirectiveDescriptor::new("manifest-src", DirectiveKind::Fetch),
    DirectiveDescriptor::new("media-src", DirectiveKind::Fetch),
    DirectiveDescriptor::new("object-src", DirectiveKind::Fetch),
    DirectiveDescriptor::new("prefetch-src", DirectiveKind::Fetch),
    DirectiveDescriptor::new("script-src", DirectiveKind::Fetch),
    DirectiveDescriptor::new("script-src-elem", DirectiveKind::Fetch),
    DirectiveDescriptor::new("script-src-attr", DirectiveKind::Fetch),
    DirectiveDescriptor::new("style-src", DirectiveKind::Fetch),
    DirectiveDescriptor::new("style-src-elem", DirectiveKind::Fetch),
    DirectiveDescriptor::new("style-src-attr", DirectiveKind::Fetch),
    DirectiveDescriptor::new("worker-src", DirectiveKind::Fetch),
    DirectiveDescriptor::new("form-action", DirectiveKind::Navigation),
    DirectiveDescriptor::new("frame-ancestors", DirectiveKind::Navigation),
    DirectiveDescriptor::new("navigate-to", DirectiveKind::Navigation),
];

pub fn compile(settings: &Settings<'_>, endpoints: &ReportEndpoints) -> Option<SecurityHeader> {
    let report_only = settings.flag(GROUP, "report_only");
    let mut out = TemplateBuilder::default();

    for directive in CSP_DIRECTIVES {
        let Some(entry) = settings.entry(GROUP, &directive.key()) else {
            continue;
        };
        let sources = sources(&entry);
        if !sources.is_empty() {
            push_directive(&mut out, directive.name, &sources, true);
        }
    }

    let plugin_types = literal(settings.list(GROUP, "plugin_types", "value"));
    if !plugin_types.is_empty() {
        push_directive(&mut out, "plugin-types", &plugin_types, true);
    }

    let sandbox = literal(settings.list(GROUP, "sandbox", "value"));
    if !sandbox.is_empty() {
        push_directive(&mut out, "sandbox", &sandbox, true);
    }

    if settings.flag(GROUP, "upgrade_insecure_requests") {
        push_directive(&mut out, "upgrade-insecure-requests", &[], true);
    }
    if settings.flag(GROUP, "block_all_mixed_content") {
        push_directive(&mut out, "block-all-mixed-content", &[], true);
    }

    if settings.flag(GROUP, "log_violations") {
        let url = endpoints.url(ReportAction::for_mode(report_only));
        push_directive(&mut out, "report-uri", &[Source::Text(url)], true);
    }

    // Must stay last: it is the only directive without a trailing `;`.
    if settings.flag("misc", "report_to") {
        let group = Source::Text(REPORT_GROUP.to_string());
        push_directive(&mut out, "report-to", &[group], false);
    }

    if out.is_empty() {
        return None;
    }

    let name = if report_only { HEADER_REPORT_ONLY } else { HEADER };
    Some(out.build(name))
}

/// One source expression. Administrator text is never scanned for nonce slots.
#[derive(Debug)]
enum Source {
    Text(String),
    Nonce,
}

fn literal(values: Vec<String>) -> Vec<Source> {
    values.into_iter().map(Source::Text).collect()
}

fn push_directive(out: &mut TemplateBuilder, name: &str, sources: &[Source], terminated: bool) {
    if !out.is_empty() {
        out.push_str(" ");
    }
    out.push_str(name);
    for source in sources {
        out.push_str(" ");
        match source {
            Source::Text(text) => out.push_str(text),
            Source::Nonce => {
                out.push_str("'nonce-");
                out.push_nonce();
                out.push_str("'");
            }
        }
    }
    if terminated {
        out.push_str(";");
    }
}

/// Render one directive entry in stored key order.
fn sources(entry: &Map<String, Value>) -> Vec<Source> {
    let mut sources = Vec::new();

    for (keyword, value) in entry {
        match keyword.as_str() {
            USER_SOURCES_KEY => sources.extend(literal(list_of(value, "value"))),
            NONCE_KEY if truthy(value) => sources.push(Source::Nonce),
            NONCE_KEY => {}
            _ if truthy(value) => {
                sources.push(Source::Text(format!("'{}'", keyword.replace('_', "-"))))
            }
            _ => {}
        }
    }

    sources
}
