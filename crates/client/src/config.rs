use std::env;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Client settings, read from `MAP_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub event_code: Option<String>,
    pub current_user_id: Option<String>,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            event_code: None,
            current_user_id: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Self::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            api_base_url: non_empty("MAP_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            event_code: non_empty("MAP_EVENT_CODE"),
            current_user_id: non_empty("MAP_CURRENT_USER_ID"),
            request_timeout: Duration::from_secs(secs_var(
                &lookup,
                "MAP_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            poll_interval: Duration::from_secs(secs_var(
                &lookup,
                "MAP_POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            )),
        }
    }
}

fn secs_var(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: u64) -> u64 {
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => {
            warn!("ignoring invalid {name}={raw:?}; using {default}");
            default
        }
        Ok(v) => v,
    }
}
