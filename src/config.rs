//! Client session configuration.
//!
//! Every field has a default, so a JSON document only needs to name what it
//! changes:
//!
//! ```json
//! { "debug": "basic", "retry": { "throttle_delay_ms": 1000 } }
//! ```

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::cookies::psl::PUBLIC_SUFFIX_LIST_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Firefox 137 on Windows.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; rv:137.0) Gecko/20100101 Firefox/137.0";

pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Connection behaviour.
    pub transport: TransportOptions,

    /// Where cookies and the suffix list are persisted.
    pub storage: StorageOptions,

    /// Redirect and retry limits.
    pub retry: RetryPolicy,

    /// How much request/response detail to log.
    pub debug: DebugLevel,

    pub user_agent: String,

    pub accept_language: String,

    /// Upstream public suffix list.
    pub public_suffix_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: TransportOptions::default(),
            storage: StorageOptions::default(),
            retry: RetryPolicy::default(),
            debug: DebugLevel::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            public_suffix_url: PUBLIC_SUFFIX_LIST_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, NetError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| NetError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, NetError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).config_context(path)?;
        Self::from_json_str(&json)
    }

    /// Reject settings the client cannot run with.
    pub fn validate(&self) -> Result<(), NetError> {
        if self.transport.max_sockets == 0 {
            return Err(NetError::invalid_config("transport.max_sockets must be at least 1"));
        }
        if self.transport.connect_timeout_ms == 0 {
            return Err(NetError::invalid_config("transport.connect_timeout_ms must be positive"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(NetError::invalid_config("user_agent must not be empty"));
        }
        if url::Url::parse(&self.public_suffix_url).is_err() {
            return Err(NetError::invalid_config(format!(
                "public_suffix_url is not a URL: {}",
                self.public_suffix_url
            )));
        }
        Ok(())
    }
}

/// Connection behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    /// Send `Connection: keep-alive`.
    pub keep_alive: bool,

    /// Upper bound on concurrently open sockets.
    pub max_sockets: usize,

    /// DNS, TCP and TLS setup must finish within this many milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            keep_alive: true,
            max_sockets: 5,
            connect_timeout_ms: 30_000,
        }
    }
}

impl TransportOptions {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageOptions {
    /// SQLite database file. `None` keeps everything in memory.
    pub database_path: Option<PathBuf>,
}

/// Redirect and retry limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_redirects: u32,

    /// Retries after `429` or a reset connection, counted together.
    pub max_retries: u32,

    /// Wait before retrying a connection reset before the response arrived.
    pub reset_retry_delay_ms: u64,

    /// Wait before retrying a `429 Too Many Requests`.
    pub throttle_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_redirects: 20,
            max_retries: 5,
            reset_retry_delay_ms: 15_000,
            throttle_delay_ms: 5 * 60 * 1000,
        }
    }
}

impl RetryPolicy {
    pub fn reset_retry_delay(&self) -> Duration {
        Duration::from_millis(self.reset_retry_delay_ms)
    }

    pub fn throttle_delay(&self) -> Duration {
        Duration::from_millis(self.throttle_delay_ms)
    }
}

/// Logging verbosity of the client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugLevel {
    #[default]
    Off,
    /// Request and response summaries.
    Basic,
    /// Summaries plus a dump of the cookie store after every response.
    Verbose,
}

impl DebugLevel {
    pub fn summaries(self) -> bool {
        self != DebugLevel::Off
    }

    pub fn store_dumps(self) -> bool {
        self == DebugLevel::Verbose
    }
}
