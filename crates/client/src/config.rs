//! Client configuration.
//!
//! Defaults, overridden by environment variables, overridden by CLI flags.

use std::time::Duration;
use coursetrack_storage::DEFAULT_TTL_HOURS;

/// Default backend base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Backend URL
pub const ENV_API_URL: &str = "COURSETRACK_API_URL";
/// Bearer token
pub const ENV_TOKEN: &str = "COURSETRACK_TOKEN";
/// Request timeout in seconds
pub const ENV_TIMEOUT: &str = "COURSETRACK_TIMEOUT_SECS";

/// Configuration for backend access.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL the `/courses/...` paths are appended to
    pub base_url: String,

    /// Bearer token, `None` when signed out
    pub token: Option<String>,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Freshness window of cached courses
    pub cache_ttl: chrono::Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: chrono::Duration::hours(DEFAULT_TTL_HOURS),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_API_URL) {
            config.base_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            config.token = Some(token);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT).and_then(|s| s.parse().ok()) {
            config.request_timeout = Duration::from_secs(secs);
        }
        config
    }
}
