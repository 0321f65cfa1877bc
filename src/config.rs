//! Environment-driven runtime configuration.
//!
//! Values are read from the process environment after loading an optional
//! `.env` file. Invalid values fall back to their defaults.

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

const ENV_API_BASE_URL: &str = "IFLOW_API_BASE_URL";
const ENV_REQUEST_TIMEOUT_MS: &str = "IFLOW_REQUEST_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl TrackerConfig {
    /// Load `.env` (if present) and read the tracker settings.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("no .env file loaded: {e}");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_BASE_URL) {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                config.api_base_url = trimmed.trim_end_matches('/').to_string();
            }
        }

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.request_timeout_ms = ms,
                _ => tracing::warn!(
                    "invalid {ENV_REQUEST_TIMEOUT_MS} value '{raw}', using {DEFAULT_REQUEST_TIMEOUT_MS}"
                ),
            }
        }

        config
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
