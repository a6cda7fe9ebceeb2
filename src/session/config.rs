//! Session configuration.
//!
//! Values come from defaults, an optional YAML file, then environment
//! overrides, in that order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Bind to any free port on loopback.
pub const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:0";

/// Default heartbeat window (milliseconds).
/// Can be overridden via COLLECTOR_PROXY_PING_TIMEOUT_MS environment variable.
pub const DEFAULT_PING_TIMEOUT_MS: u64 = 3000;

pub const ENV_LISTEN: &str = "COLLECTOR_PROXY_LISTEN";
pub const ENV_TOKEN: &str = "COLLECTOR_PROXY_TOKEN";
pub const ENV_PING_TIMEOUT_MS: &str = "COLLECTOR_PROXY_PING_TIMEOUT_MS";

const TOKEN_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Address to bind; port 0 picks any free port.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    /// Token callers must present. `None` disables authentication.
    #[serde(default)]
    pub token: Option<String>,
    /// Time without a ping after which the session terminates itself.
    #[serde(default = "default_ping_timeout_ms")]
    pub ping_timeout_ms: u64,
}

fn default_listen_address() -> String {
    DEFAULT_LISTEN_ADDRESS.to_string()
}

fn default_ping_timeout_ms() -> u64 {
    DEFAULT_PING_TIMEOUT_MS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            token: None,
            ping_timeout_ms: default_ping_timeout_ms(),
        }
    }
}

impl SessionConfig {
    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Loads a YAML document holding session settings.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Applies `COLLECTOR_PROXY_*` environment overrides.
    ///
    /// Unparseable values are ignored and the current value is kept.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Ok(listen) = std::env::var(ENV_LISTEN) {
            if !listen.is_empty() {
                self.listen_address = listen;
            }
        }
        if let Ok(token) = std::env::var(ENV_TOKEN) {
            self.token = (!token.is_empty()).then_some(token);
        }
        if let Some(timeout) = std::env::var(ENV_PING_TIMEOUT_MS)
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.ping_timeout_ms = timeout;
        }
        self
    }
}

/// Generates a random alphanumeric auth token.
pub fn generate_token() -> String {
    rand::Rng::sample_iter(rand::thread_rng(), &rand::distributions::Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}
