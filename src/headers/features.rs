//! Permissions-Policy and Feature-Policy compilers.
//!
//! Both headers describe the same thing (which origins may use a browser
//! feature) with different syntax, so one pass builds a list of
//! [`FeatureDirective`]s and a [`FeatureSyntax`] decides the tokens and how
//! they are joined.
//!
//! Each feature entry looks like
//! `{"none": bool, "all": bool, "self": bool, "origins": [{"origin": ".."}]}`
//! and is keyed by the feature name in group `permissionsPolicy` or
//! `featurePolicy`.

use serde_json::{Map, Value};

use super::value::SecurityHeader;
use crate::settings::{
    Settings,
    view::{list_of, truthy},
};

pub const PERMISSIONS_GROUP: &str = "permissionsPolicy";
pub const FEATURE_GROUP: &str = "featurePolicy";

/// Recognized feature names, in output order.
pub static FEATURES: &[&str] = &[
    "accelerometer",
    "ambient-light-sensor",
    "autoplay",
    "battery",
    "camera",
    "display-capture",
    "document-domain",
    "encrypted-media",
    "execution-while-not-rendered",
    "execution-while-out-of-viewport",
    "fullscreen",
    "geolocation",
    "gyroscope",
    "layout-animations",
    "legacy-image-formats",
    "magnetometer",
    "microphone",
    "midi",
    "navigation-override",
    "oversized-images",
    "payment",
    "picture-in-picture",
    "publickey-credentials-get",
    "screen-wake-lock",
    "sync-xhr",
    "usb",
    "web-share",
    "xr-spatial-tracking",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSyntax {
    /// `camera=(self "https://a.example")`
    Permissions,
    /// `camera 'self' https://a.example`
    Feature,
}

impl FeatureSyntax {
    fn none_tokens(&self) -> Vec<String> {
        match self {
            Self::Permissions => Vec::new(),
            Self::Feature => vec!["'none'".to_string()],
        }
    }

    fn self_token(&self) -> &'static str {
        match self {
            Self::Permissions => "self",
            Self::Feature => "'self'",
        }
    }

    fn origin_token(&self, origin: &str) -> String {
        match self {
            Self::Permissions => format!("\"{origin}\""),
            Self::Feature => origin.to_string(),
        }
    }

    fn render(&self, directive: &FeatureDirective) -> String {
        let tokens = directive.tokens.join(" ");
        match self {
            Self::Permissions => format!("{}=({})", directive.feature, tokens),
            Self::Feature => format!("{} {}", directive.feature, tokens),
        }
    }

    fn separator(&self) -> &'static str {
        match self {
            Self::Permissions => ", ",
            Self::Feature => "; ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDirective {
    pub feature: &'static str,
    pub tokens: Vec<String>,
}

/// Allow-lists for every configured feature in `group`, registry order.
pub fn directives(settings: &Settings<'_>, group: &str, syntax: FeatureSyntax) -> Vec<FeatureDirective> {
    FEATURES
        .iter()
        .filter_map(|&feature| {
            let entry = settings.entry(group, feature)?;
            let tokens = tokens(&entry, syntax)?;
            Some(FeatureDirective { feature, tokens })
        })
        .collect()
}

fn tokens(entry: &Map<String, Value>, syntax: FeatureSyntax) -> Option<Vec<String>> {
    let flag = |key: &str| entry.get(key).is_some_and(truthy);
    let origins = entry
        .get("origins")
        .map(|v| list_of(v, "origin"))
        .unwrap_or_default();

    // `all` alone does not count as configured.
    if !flag("none") && !flag("self") && origins.is_empty() {
        return None;
    }

    if flag("none") {
        return Some(syntax.none_tokens());
    }
    if flag("all") {
        return Some(vec!["*".to_string()]);
    }

    let mut tokens = Vec::with_capacity(origins.len() + 1);
    if flag("self") {
        tokens.push(syntax.self_token().to_string());
    }
    tokens.extend(origins.iter().map(|o| syntax.origin_token(o)));
    Some(tokens)
}

pub fn compile_permissions_policy(settings: &Settings<'_>) -> Option<SecurityHeader> {
    if !settings.flag(PERMISSIONS_GROUP, "enabled") {
        return None;
    }

    let syntax = FeatureSyntax::Permissions;
    let mut entries: Vec<String> = directives(settings, PERMISSIONS_GROUP, syntax)
        .iter()
        .map(|d| syntax.render(d))
        .collect();

    // Free-text escape hatch for features the registry does not know yet.
    if let Some(custom) = settings.text(PERMISSIONS_GROUP, "custom") {
        entries.push(custom);
    }

    if entries.is_empty() {
        return None;
    }

    let name = if settings.flag(PERMISSIONS_GROUP, "report_only") {
        "Permissions-Policy-Report-Only"
    } else {
        "Permissions-Policy"
    };
    Some(SecurityHeader::new(name, entries.join(syntax.separator())))
}

pub fn compile_feature_policy(settings: &Settings<'_>) -> Option<SecurityHeader> {
    if !settings.flag("misc", "feature_policy") {
        return None;
    }

    let syntax = FeatureSyntax::Feature;
    let entries: Vec<String> = directives(settings, FEATURE_GROUP, syntax)
        .iter()
        .map(|d| syntax.render(d))
        .collect();

    if entries.is_empty() {
        return None;
    }

    let name = if settings.flag("misc", "feature_policy_report_only") {
        "Feature-Policy-Report-Only"
    } else {
        "Feature-Policy"
    };
    Some(SecurityHeader::new(name, entries.join(syntax.separator())))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::settings::MemorySettings;

    fn both(features: Value) -> (Option<SecurityHeader>, Option<SecurityHeader>) {
        let store = MemorySettings::from_value(json!({
            "permissionsPolicy": { "enabled": true },
            "featurePolicy": {},
            "misc": { "feature_policy": true },
        }))
        .expect("fixture should load");

        if let Value::Object(map) = features {
            let mut permissions = map.clone();
            permissions.insert("enabled".into(), json!(true));
            store.replace_group(PERMISSIONS_GROUP, permissions);
            store.replace_group(FEATURE_GROUP, map);
        }

        let settings = Settings::new(&store);
        (
            compile_permissions_policy(&settings),
            compile_feature_policy(&settings),
        )
    }

    #[test]
    fn none_blocks_the_feature() {
        let (permissions, feature) = both(json!({ "camera": { "none": true, "self": true } }));

        let permissions = permissions.expect("permissions policy");
        assert_eq!(permissions.name(), "Permissions-Policy");
        assert_eq!(permissions.template(), "camera=()");

        let feature = feature.expect("feature policy");
        assert_eq!(feature.name(), "Feature-Policy");
        assert_eq!(feature.template(), "camera 'none'");
    }

    #[test]
    fn self_then_origins_in_list_order() {
        let (permissions, feature) = both(json!({
            "geolocation": {
                "self": true,
                "origins": [{ "origin": "https://b.example" }, { "origin": "https://a.example" }],
            },
            "camera": { "origins": [{ "origin": "https://c.example" }] },
        }));

        assert_eq!(
            permissions.expect("permissions policy").template(),
            "camera=(\"https://c.example\"), \
             geolocation=(self \"https://b.example\" \"https://a.example\")"
        );
        assert_eq!(
            feature.expect("feature policy").template(),
            "camera https://c.example; geolocation 'self' https://b.example https://a.example"
        );
    }

    #[test]
    fn all_wins_over_origins_but_needs_something_configured() {
        let (permissions, feature) = both(json!({
            "fullscreen": { "all": true, "self": true, "origins": [{ "origin": "https://x.example" }] },
            "payment": { "all": true },
        }));

        assert_eq!(permissions.expect("permissions policy").template(), "fullscreen=(*)");
        assert_eq!(feature.expect("feature policy").template(), "fullscreen *");
    }

    #[test]
    fn unknown_and_empty_features_are_skipped() {
        let (permissions, feature) = both(json!({
            "teleport": { "self": true },
            "camera": { "none": false, "self": false, "origins": [] },
            "microphone": "self",
        }));

        assert_eq!(permissions, None);
        assert_eq!(feature, None);
    }

    #[test]
    fn custom_is_appended_and_blank_custom_is_dropped() {
        let store = MemorySettings::from_value(json!({
            "permissionsPolicy": {
                "enabled": true,
                "report_only": true,
                "usb": { "none": true },
                "custom": "  interest-cohort=()  ",
            }
        }))
        .expect("fixture should load");

        let header = compile_permissions_policy(&Settings::new(&store)).expect("permissions policy");
        assert_eq!(header.name(), "Permissions-Policy-Report-Only");
        assert_eq!(header.template(), "usb=(), interest-cohort=()");

        let store = MemorySettings::from_value(json!({
            "permissionsPolicy": { "enabled": true, "usb": { "none": true }, "custom": "   " }
        }))
        .expect("fixture should load");
        let header = compile_permissions_policy(&Settings::new(&store)).expect("permissions policy");
        assert_eq!(header.template(), "usb=()");
    }

    #[test]
    fn custom_alone_is_enough() {
        let store = MemorySettings::from_value(json!({
            "permissionsPolicy": { "enabled": true, "custom": "browsing-topics=()" }
        }))
        .expect("fixture should load");

        let header = compile_permissions_policy(&Settings::new(&store)).expect("permissions policy");
        assert_eq!(header.template(), "browsing-topics=()");
    }

    #[test]
    fn disabled_headers_are_absent() {
        let store = MemorySettings::from_value(json!({
            "permissionsPolicy": { "enabled": false, "camera": { "none": true }, "custom": "x=()" },
            "featurePolicy": { "camera": { "none": true } },
            "misc": { "feature_policy": false },
        }))
        .expect("fixture should load");
        let settings = Settings::new(&store);

        assert_eq!(compile_permissions_policy(&settings), None);
        assert_eq!(compile_feature_policy(&settings), None);
    }

    #[test]
    fn feature_policy_report_only_name() {
        let store = MemorySettings::from_value(json!({
            "featurePolicy": { "camera": { "self": true } },
            "misc": { "feature_policy": true, "feature_policy_report_only": true },
        }))
        .expect("fixture should load");

        let header = compile_feature_policy(&Settings::new(&store)).expect("feature policy");
        assert_eq!(header.name(), "Feature-Policy-Report-Only");
        assert_eq!(header.template(), "camera 'self'");
    }
}
