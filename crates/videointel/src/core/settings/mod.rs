//! Client Settings
//!
//! Endpoint, credentials and polling behaviour for the annotation client.
//! Settings start from defaults and can be overridden from the environment:
//!
//! - `VIDEOINTEL_API_KEY` / `VIDEOINTEL_ACCESS_TOKEN`
//! - `VIDEOINTEL_BASE_URL`
//! - `VIDEOINTEL_POLL_INTERVAL_SECS`
//! - `VIDEOINTEL_MAX_WAIT_SECS` (unset = wait indefinitely)
//! - `VIDEOINTEL_REQUEST_TIMEOUT_SECS`

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::jobs::PollConfig;
use crate::core::{CoreError, CoreResult};

/// Default Video Intelligence endpoint (microsecond time offsets)
pub const DEFAULT_BASE_URL: &str = "https://videointelligence.googleapis.com/v1beta1";

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

pub const ENV_API_KEY: &str = "VIDEOINTEL_API_KEY";
pub const ENV_ACCESS_TOKEN: &str = "VIDEOINTEL_ACCESS_TOKEN";
pub const ENV_BASE_URL: &str = "VIDEOINTEL_BASE_URL";
pub const ENV_POLL_INTERVAL_SECS: &str = "VIDEOINTEL_POLL_INTERVAL_SECS";
pub const ENV_MAX_WAIT_SECS: &str = "VIDEOINTEL_MAX_WAIT_SECS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "VIDEOINTEL_REQUEST_TIMEOUT_SECS";

// =============================================================================
// Credentials
// =============================================================================

/// How requests authenticate with the service
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// API key sent in the `x-goog-api-key` header
    ApiKey(String),
    /// OAuth 2.0 access token sent as a bearer header
    BearerToken(String),
}

impl Credential {
    pub fn is_empty(&self) -> bool {
        match self {
            Credential::ApiKey(value) | Credential::BearerToken(value) => value.trim().is_empty(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::ApiKey(_) => write!(f, "ApiKey(<redacted>)"),
            Credential::BearerToken(_) => write!(f, "BearerToken(<redacted>)"),
        }
    }
}

// =============================================================================
// Client Settings
// =============================================================================

/// Annotation client configuration
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientSettings {
    /// Service base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (takes precedence over the access token)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OAuth access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Delay between operation polls
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Upper bound on waiting for completion; `None` waits indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wait_secs: Option<u64>,

    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            access_token: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_wait_secs: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential())
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("max_wait_secs", &self.max_wait_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ClientSettings {
    /// Loads settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings from an arbitrary key lookup, falling back to defaults.
    ///
    /// Unparseable numeric values are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_u64 = |key: &str| {
            get(key).and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Ignoring invalid {}='{}': {}", key, raw, e);
                    None
                }
            })
        };

        let defaults = Self::default();
        Self {
            base_url: get(ENV_BASE_URL).unwrap_or(defaults.base_url),
            api_key: get(ENV_API_KEY),
            access_token: get(ENV_ACCESS_TOKEN),
            poll_interval_secs: get_u64(ENV_POLL_INTERVAL_SECS)
                .unwrap_or(defaults.poll_interval_secs),
            max_wait_secs: get_u64(ENV_MAX_WAIT_SECS),
            request_timeout_secs: get_u64(ENV_REQUEST_TIMEOUT_SECS)
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    /// Configured credential, API key first
    pub fn credential(&self) -> Option<Credential> {
        self.api_key
            .clone()
            .map(Credential::ApiKey)
            .or_else(|| self.access_token.clone().map(Credential::BearerToken))
    }

    /// Polling behaviour for the job client
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_wait: self.max_wait_secs.map(Duration::from_secs),
        }
    }

    /// Validates settings
    pub fn validate(&self) -> CoreResult<()> {
        let base_url = self.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CoreError::ValidationError(format!(
                "Base URL must be http(s): '{}'",
                self.base_url
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(CoreError::ValidationError(
                "Poll interval must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::ValidationError(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
