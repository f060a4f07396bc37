use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_AUTH_URL: &str = "http://localhost:3000";
pub const DEFAULT_TRANSPORT_URL: &str = "ws://localhost:3001/";

/// Refresh twelve minutes after each grant; access tokens live longer.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 12 * 60;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Whether a sent message is appended to the transcript immediately.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EchoPolicy {
    /// The server broadcasts every message back to its sender.
    #[default]
    ServerBroadcast,
    /// Append our own messages locally; the server does not echo.
    Local,
}

impl std::str::FromStr for EchoPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "server_broadcast" | "server" => Ok(Self::ServerBroadcast),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown echo policy '{}'", other)),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the auth API (`/api/auth/*` is appended).
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    /// Real-time transport endpoint.
    #[serde(default = "default_transport_url")]
    pub transport_url: String,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub echo_policy: EchoPolicy,
}

impl ClientConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            transport_url: default_transport_url(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            echo_policy: EchoPolicy::default(),
        }
    }
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_transport_url() -> String {
    DEFAULT_TRANSPORT_URL.to_string()
}

fn default_refresh_interval_secs() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
