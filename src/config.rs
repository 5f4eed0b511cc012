//! Assistant client configuration.
//!
//! Values come from builder calls or from `WELLCHAT_*` environment
//! variables. Invalid numeric values fall back to the default with a warning.

use std::time::Duration;
use tracing::warn;

use crate::error::{AssistError, AssistResult};

/// Default chat endpoint (local development edge function).
pub const DEFAULT_ENDPOINT: &str = "http://localhost:54321/functions/v1/chat";
/// Default locale tag.
pub const DEFAULT_LOCALE: &str = "en";
/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const ENV_ENDPOINT: &str = "WELLCHAT_ENDPOINT";
pub const ENV_LOCALE: &str = "WELLCHAT_LOCALE";
pub const ENV_CONNECT_TIMEOUT: &str = "WELLCHAT_CONNECT_TIMEOUT";

/// Configuration for the assistant client.
///
/// # Example
///
/// ```ignore
/// use wellchat::config::AssistConfig;
///
/// let config = AssistConfig::default()
///     .with_endpoint("https://example.supabase.co/functions/v1/chat")
///     .with_locale("pt-BR");
/// config.validate()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistConfig {
    /// Streaming chat endpoint URL
    pub endpoint: String,
    /// Locale tag used for canned replies and the upsell message
    pub locale: String,
    /// Connect timeout for the transport (the stream itself is unbounded)
    pub connect_timeout_secs: u64,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl AssistConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chat endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the locale tag.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Set the connect timeout in seconds.
    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Build config from `WELLCHAT_ENDPOINT`, `WELLCHAT_LOCALE` and
    /// `WELLCHAT_CONNECT_TIMEOUT`. Unset variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_string();
        }

        if let Some(locale) = lookup(ENV_LOCALE).filter(|v| !v.trim().is_empty()) {
            config.locale = locale.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_CONNECT_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.connect_timeout_secs = secs,
                _ => warn!(
                    "Ignoring invalid {}={:?}, using {}s",
                    ENV_CONNECT_TIMEOUT, raw, DEFAULT_CONNECT_TIMEOUT_SECS
                ),
            }
        }

        config
    }

    /// Check that the endpoint is an http(s) URL and the timeout is non-zero.
    pub fn validate(&self) -> AssistResult<()> {
        let endpoint = self.endpoint.trim();
        let has_scheme = endpoint.starts_with("http://") || endpoint.starts_with("https://");
        let has_host = endpoint
            .split_once("://")
            .map(|(_, rest)| !rest.is_empty() && !rest.starts_with('/'))
            .unwrap_or(false);

        if !has_scheme || !has_host {
            return Err(AssistError::Configuration {
                message: format!("endpoint must be an http(s) URL, got '{}'", self.endpoint),
            });
        }

        if self.connect_timeout_secs == 0 {
            return Err(AssistError::Configuration {
                message: "connect timeout must be at least one second".to_string(),
            });
        }

        Ok(())
    }
}
