use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_CACHE_DIR: &str = ".portal-cache";

/// Application configuration loaded from environment variables.
/// Everything except the identity has a default; the identity falls back to a guest.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub user_email: Option<String>,
    pub user_name: String,
    pub token: Option<String>,
    pub cache_dir: String,
    pub request_timeout_secs: u64,
    pub jobs_poll_ms: u64,
    pub applications_poll_ms: u64,
    pub notifications_poll_ms: u64,
    pub fallback_min_token_len: usize,
    pub alert_ttl_ms: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_email: None,
            user_name: "User".to_string(),
            token: None,
            cache_dir: DEFAULT_CACHE_DIR.to_string(),
            request_timeout_secs: 15,
            jobs_poll_ms: 60_000,
            applications_poll_ms: 30_000,
            notifications_poll_ms: 30_000,
            fallback_min_token_len: 1,
            alert_ttl_ms: 4_000,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            api_url: optional_env("PORTAL_API_URL").unwrap_or(defaults.api_url),
            user_email: optional_env("PORTAL_USER_EMAIL"),
            user_name: optional_env("PORTAL_USER_NAME").unwrap_or(defaults.user_name),
            token: optional_env("PORTAL_TOKEN"),
            cache_dir: optional_env("PORTAL_CACHE_DIR").unwrap_or(defaults.cache_dir),
            request_timeout_secs: parse_env(
                "PORTAL_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            jobs_poll_ms: parse_env("PORTAL_JOBS_POLL_MS", defaults.jobs_poll_ms)?,
            applications_poll_ms: parse_env(
                "PORTAL_APPLICATIONS_POLL_MS",
                defaults.applications_poll_ms,
            )?,
            notifications_poll_ms: parse_env(
                "PORTAL_NOTIFICATIONS_POLL_MS",
                defaults.notifications_poll_ms,
            )?,
            fallback_min_token_len: parse_env(
                "PORTAL_FALLBACK_MIN_TOKEN_LEN",
                defaults.fallback_min_token_len,
            )?,
            alert_ttl_ms: parse_env("PORTAL_ALERT_TTL_MS", defaults.alert_ttl_ms)?,
            port: parse_env("PORTAL_PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }

    /// `0` disables repeat polling for a resource (fetch once on start).
    pub fn poll_interval(ms: u64) -> Option<Duration> {
        (ms > 0).then(|| Duration::from_millis(ms))
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            token: self.token.clone(),
        }
    }
}

/// HTTP client settings, built once per session and handed to `PortalClient::new`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub token: Option<String>,
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
