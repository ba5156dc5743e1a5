/*
 * Responsibility
 * - Read process configuration from the environment (.env supported)
 * - Validate it (fail startup on invalid values)
 * - Policy settings (CSP, HSTS, ...) are NOT here: they live in `settings`
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // JSON file with the initial settings groups; empty settings when unset.
    pub settings_path: Option<PathBuf>,

    // Shared header cache. Process memory when unset.
    pub valkey_url: Option<String>,
    pub cache_prefix: String,

    // Base URL of the violation report collector (`<base>/enforce`, `<base>/report_only`).
    pub csp_report_base_url: String,

    // Bearer token for the settings API. Required in production.
    pub admin_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let settings_path = optional_var("SETTINGS_PATH").map(PathBuf::from);
        let valkey_url = optional_var("VALKEY_URL");

        let cache_prefix =
            optional_var("CACHE_PREFIX").unwrap_or_else(|| "security-headers".to_string());
        if cache_prefix.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid("CACHE_PREFIX"));
        }

        let csp_report_base_url =
            optional_var("CSP_REPORT_BASE_URL").unwrap_or_else(|| "/csp-report".to_string());

        let admin_token = optional_var("ADMIN_TOKEN");
        if app_env.is_production() && admin_token.is_none() {
            return Err(ConfigError::Missing("ADMIN_TOKEN"));
        }

        Ok(Self {
            addr,
            app_env,
            settings_path,
            valkey_url,
            cache_prefix,
            csp_report_base_url,
            admin_token,
        })
    }
}

/// Unset and blank are the same thing.
fn optional_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
