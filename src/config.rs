//! Client configuration.
//!
//! [`ClientConfig`] is passed explicitly into [`ApiCtx`](crate::ctx::ApiCtx)
//! at construction. Library code never reads the process environment; only
//! [`ClientConfig::from_env`] does, and it is meant to be called once at the
//! binary edge.

use crate::error::{ConsoleError, Result};
use std::time::Duration;

/// Default service location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable holding the service base URL.
pub const BASE_URL_ENV: &str = "TICKET_API_BASE_URL";

/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "TICKET_API_TIMEOUT_SECS";

/// Connection settings for the ticket service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the service (e.g. `http://localhost:8000`). Normalized.
    pub base_url: String,
    /// Per-request timeout. `None` leaves requests unbounded.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Create a config for the given base URL.
    ///
    /// Rejects empty URLs and URLs without an `http://` or `https://` scheme.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            base_url: validate_base_url(base_url.as_ref())?,
            timeout: None,
        })
    }

    /// Replace the base URL, validating it like [`new`](Self::new).
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        self.base_url = validate_base_url(base_url.as_ref())?;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read the config from `TICKET_API_BASE_URL` / `TICKET_API_TIMEOUT_SECS`,
    /// falling back to [`DEFAULT_BASE_URL`] and no timeout.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(base_url)?;
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ConsoleError::InvalidConfig(format!("{} must be whole seconds, got {:?}", TIMEOUT_ENV, raw))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        Ok(config)
    }

    /// Join an endpoint path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url, path.trim_start_matches('/'))
}

fn validate_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ConsoleError::InvalidConfig("base URL is empty".into()));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConsoleError::InvalidConfig(format!(
            "base URL must start with http:// or https://, got {:?}",
            trimmed
        )));
    }
    Ok(normalize_base_url(trimmed))
}

/// Strip a trailing slash and a trailing `/api` so endpoint paths
/// (which all start with `/api/...`) are never doubled.
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    match trimmed.strip_suffix("/api") {
        Some(stripped) => stripped.to_string(),
        None => trimmed.to_string(),
    }
}
