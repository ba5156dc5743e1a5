//! Where browsers send CSP violation reports.
//!
//! The ingestion endpoint is a separate service; here we only build its
//! URLs. Enforced and report-only policies report to different actions so
//! the two streams can be told apart.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    Enforce,
    ReportOnly,
}

impl ReportAction {
    pub fn for_mode(report_only: bool) -> Self {
        if report_only {
            Self::ReportOnly
        } else {
            Self::Enforce
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enforce => "enforce",
            Self::ReportOnly => "report_only",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEndpoints {
    base: String,
}

impl ReportEndpoints {
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, action: ReportAction) -> String {
        format!("{}/{}", self.base, action.as_str())
    }
}

impl Default for ReportEndpoints {
    fn default() -> Self {
        Self::new("/csp-report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_action() {
        let endpoints = ReportEndpoints::new("https://example.com/csp/");

        assert_eq!(
            endpoints.url(ReportAction::Enforce),
            "https://example.com/csp/enforce"
        );
        assert_eq!(
            endpoints.url(ReportAction::for_mode(true)),
            "https://example.com/csp/report_only"
        );
    }
}
