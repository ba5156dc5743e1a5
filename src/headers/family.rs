//! Catalog of header families: what each one is called in the cache,
//! which compiler builds it and which settings groups feed it.

use super::{csp, features, report::ReportEndpoints, simple, value::SecurityHeader};
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderFamily {
    Csp,
    Hsts,
    ReferrerPolicy,
    FrameOptions,
    ContentTypeOptions,
    XssProtection,
    PermissionsPolicy,
    FeaturePolicy,
    ReportTo,
}

impl HeaderFamily {
    /// Attachment order.
    pub const ALL: [HeaderFamily; 9] = [
        Self::Csp,
        Self::Hsts,
        Self::ReferrerPolicy,
        Self::FrameOptions,
        Self::ContentTypeOptions,
        Self::XssProtection,
        Self::PermissionsPolicy,
        Self::FeaturePolicy,
        Self::ReportTo,
    ];

    pub fn cache_key(&self) -> &'static str {
        match self {
            Self::Csp => "csp",
            Self::Hsts => "hsts",
            Self::ReferrerPolicy => "referrer-policy",
            Self::FrameOptions => "frame-options",
            Self::ContentTypeOptions => "content-type-options",
            Self::XssProtection => "xss-protection",
            Self::PermissionsPolicy => "permissions-policy",
            Self::FeaturePolicy => "feature-policy",
            Self::ReportTo => "report-to",
        }
    }

    pub fn compile(
        &self,
        settings: &Settings<'_>,
        endpoints: &ReportEndpoints,
    ) -> Option<SecurityHeader> {
        match self {
            Self::Csp => csp::compile(settings, endpoints),
            Self::Hsts => simple::strict_transport_security(settings),
            Self::ReferrerPolicy => simple::referrer_policy(settings),
            Self::FrameOptions => simple::frame_options(settings),
            Self::ContentTypeOptions => simple::content_type_options(settings),
            Self::XssProtection => simple::xss_protection(settings),
            Self::PermissionsPolicy => features::compile_permissions_policy(settings),
            Self::FeaturePolicy => features::compile_feature_policy(settings),
            Self::ReportTo => simple::report_to(settings, endpoints),
        }
    }

    /// Settings groups whose change makes this family's cached value stale.
    pub fn groups(&self) -> &'static [&'static str] {
        match self {
            Self::Csp => &["csp", "misc"],
            Self::Hsts => &["hsts"],
            Self::ReferrerPolicy
            | Self::FrameOptions
            | Self::ContentTypeOptions
            | Self::XssProtection => &["misc"],
            Self::PermissionsPolicy => &[features::PERMISSIONS_GROUP],
            Self::FeaturePolicy => &[features::FEATURE_GROUP, "misc"],
            Self::ReportTo => &["misc", "csp"],
        }
    }

    pub fn reads(&self, group: &str) -> bool {
        self.groups().contains(&group)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn cache_keys_are_unique() {
        let keys: HashSet<_> = HeaderFamily::ALL.iter().map(|f| f.cache_key()).collect();
        assert_eq!(keys.len(), HeaderFamily::ALL.len());
    }

    #[test]
    fn misc_feeds_most_families() {
        let stale: Vec<_> = HeaderFamily::ALL
            .into_iter()
            .filter(|f| f.reads("misc"))
            .collect();

        assert!(stale.contains(&HeaderFamily::Csp));
        assert!(stale.contains(&HeaderFamily::FeaturePolicy));
        assert!(!stale.contains(&HeaderFamily::Hsts));
        assert!(!stale.contains(&HeaderFamily::PermissionsPolicy));
        assert!(HeaderFamily::ReportTo.reads("csp"));
    }
}
