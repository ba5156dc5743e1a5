//! Compilers for the single-setting headers.

use serde::Serialize;

use super::{
    csp::REPORT_GROUP,
    report::{ReportAction, ReportEndpoints},
    value::SecurityHeader,
};
use crate::settings::{Settings, view::as_integer};

/// One year, the HSTS preload list minimum.
pub const DEFAULT_HSTS_MAX_AGE: u64 = 31_536_000;

/// 30 days.
const REPORT_TO_MAX_AGE: u64 = 2_592_000;

pub fn strict_transport_security(settings: &Settings<'_>) -> Option<SecurityHeader> {
    if !settings.flag("hsts", "enabled") {
        return None;
    }

    let max_age = match settings.value("hsts", "max_age") {
        None => DEFAULT_HSTS_MAX_AGE,
        Some(value) => match as_integer(&value) {
            Some(max_age) => max_age,
            None => {
                tracing::warn!(?value, "ignoring HSTS with malformed max_age");
                return None;
            }
        },
    };

    let mut value = format!("max-age={max_age}");
    if settings.flag("hsts", "subdomains") {
        value.push_str("; includeSubDomains");
    }
    if settings.flag("hsts", "preload") {
        value.push_str("; preload");
    }
    Some(SecurityHeader::new("Strict-Transport-Security", value))
}

pub fn referrer_policy(settings: &Settings<'_>) -> Option<SecurityHeader> {
    settings
        .text("misc", "referrer_policy")
        .map(|policy| SecurityHeader::new("Referrer-Policy", policy))
}

pub fn frame_options(settings: &Settings<'_>) -> Option<SecurityHeader> {
    settings
        .text("misc", "frame_options")
        .map(|option| SecurityHeader::new("X-Frame-Options", option))
}

pub fn content_type_options(settings: &Settings<'_>) -> Option<SecurityHeader> {
    settings
        .flag("misc", "content_type_options")
        .then(|| SecurityHeader::new("X-Content-Type-Options", "nosniff"))
}

pub fn xss_protection(settings: &Settings<'_>) -> Option<SecurityHeader> {
    let value = match settings.text("misc", "xss_protection")?.as_str() {
        "disable" => "0",
        "enable" => "1",
        "block" => "1; mode=block",
        _ => return None,
    };
    Some(SecurityHeader::new("X-XSS-Protection", value))
}

#[derive(Serialize)]
struct ReportToGroup<'a> {
    group: &'a str,
    max_age: u64,
    endpoints: Vec<ReportToEndpoint>,
}

#[derive(Serialize)]
struct ReportToEndpoint {
    url: String,
}

pub fn report_to(settings: &Settings<'_>, endpoints: &ReportEndpoints) -> Option<SecurityHeader> {
    if !settings.flag("misc", "report_to") {
        return None;
    }

    let action = ReportAction::for_mode(settings.flag("csp", "report_only"));
    let body = ReportToGroup {
        group: REPORT_GROUP,
        max_age: REPORT_TO_MAX_AGE,
        endpoints: vec![ReportToEndpoint {
            url: endpoints.url(action),
        }],
    };

    match serde_json::to_string(&body) {
        Ok(json) => Some(SecurityHeader::new("Report-To", json)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to encode Report-To");
            None
        }
    }
}
