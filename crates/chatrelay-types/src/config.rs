//! Configuration schema for the chatrelay service.
//!
//! Deserialized from `config.toml` in the data directory by
//! `chatrelay-infra::config::load_config`. Every field has a default so a
//! missing or partial file still produces a working configuration.

use secrecy::SecretString;
use serde::Deserialize;

/// Default Ollama base URL.
pub const DEFAULT_UPSTREAM_URL: &str = "http://localhost:11434";

/// Default model when a chat request names none.
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Default per-fragment idle window, in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 120;

/// Default connect timeout, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Upstream inference engine settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the Ollama-compatible server.
    pub base_url: String,
    /// Abort the stream when no fragment arrives within this window.
    pub idle_timeout_secs: u64,
    /// Abort connection attempts after this long.
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub upstream: UpstreamConfig,
    /// Model used when the chat request omits one.
    pub default_model: Option<String>,
    /// Static shared secret required on API requests. Auth is disabled when
    /// unset (local single-user deployments).
    pub api_token: Option<SecretString>,
}

impl Config {
    /// Model to use when the request names none.
    pub fn default_model(&self) -> &str {
        self.default_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}
