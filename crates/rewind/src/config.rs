//! Client configuration, read from a JSON file.
//!
//! Keys are PascalCase:
//!
//! ```json
//! {
//!   "ServerHost": "rewind.example.net",
//!   "ServerPort": 54005,
//!   "ServerPassword": "passw0rd",
//!   "AppID": 2161,
//!   "ServerTimeoutSeconds": 30,
//!   "RecTalkgroupID": 91,
//!   "CallHangTimeSeconds": 3
//! }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rewind_session::SessionConfig;
use rewind_timer::TimerConfig;
use serde::{Deserialize, Serialize};

/// Errors from loading a [`ClientConfig`]. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything the client needs to reach one relay server and subscribe
/// to one talkgroup.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClientConfig {
    pub server_host: String,
    pub server_port: u16,
    /// Key material for challenge responses.
    pub server_password: String,
    #[serde(rename = "AppID")]
    pub app_id: u32,
    /// Silence, in seconds, after which the session is considered dead.
    #[serde(default = "default_server_timeout")]
    pub server_timeout_seconds: u64,
    #[serde(rename = "RecTalkgroupID")]
    pub talkgroup: u32,
    /// Read and kept, but nothing uses it yet.
    #[serde(default = "default_call_hang_time")]
    pub call_hang_time_seconds: u64,
}

fn default_server_timeout() -> u64 {
    30
}

fn default_call_hang_time() -> u64 {
    3
}

impl ClientConfig {
    /// Reads, parses, and validates the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), ?config, "configuration loaded");
        Ok(config)
    }

    /// Parses and validates a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_host.trim().is_empty() {
            return Err(ConfigError::Invalid("ServerHost must not be empty".into()));
        }
        if self.server_port == 0 {
            return Err(ConfigError::Invalid("ServerPort must not be 0".into()));
        }
        if self.server_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "ServerTimeoutSeconds must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Identity and subscription target for the session engine.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.server_password.clone(), self.app_id, self.talkgroup)
    }

    /// Keepalive and timeout deadlines for the session engine.
    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig::with_timeout(Duration::from_secs(self.server_timeout_seconds))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("server_password", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("server_timeout_seconds", &self.server_timeout_seconds)
            .field("talkgroup", &self.talkgroup)
            .field("call_hang_time_seconds", &self.call_hang_time_seconds)
            .finish()
    }
}
