//! Configuration structures.
//!
//! The binary fills these from CLI flags and environment variables; library
//! users construct them directly.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::types::Result;
use crate::validation::{validate_non_empty, validate_positive};

/// Default path of the partner token endpoint.
pub const DEFAULT_AUTH_PATH: &str = "/api/v5/authentication/token";

/// Global bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Partner API connection and credentials.
    pub partner: PartnerConfig,

    /// Request/response server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// IPC transport configuration.
    #[serde(default)]
    pub ipc: IpcConfig,
}

impl Config {
    /// Build a config with defaults around the given partner settings.
    pub fn new(partner: PartnerConfig) -> Self {
        Self {
            partner,
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
            ipc: IpcConfig::default(),
        }
    }

    /// Reject configurations the bridge cannot start with.
    pub fn validate(&self) -> Result<()> {
        validate_non_empty(&self.partner.api_host, "partner.api_host")?;
        validate_non_empty(&self.partner.app_id, "partner.app_id")?;
        validate_non_empty(&self.partner.api_secret, "partner.api_secret")?;
        validate_non_empty(&self.partner.auth_path, "partner.auth_path")?;
        validate_positive(self.ipc.max_connections as u64, "ipc.max_connections")?;
        validate_positive(self.ipc.max_frame_bytes as u64, "ipc.max_frame_bytes")?;
        validate_positive(
            self.partner.request_timeout.as_millis() as u64,
            "partner.request_timeout",
        )?;
        if let Some(key) = &self.server.api_key {
            validate_non_empty(key, "server.api_key")?;
        }
        Ok(())
    }
}

/// Partner API configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct PartnerConfig {
    /// Base URL of the partner API, without trailing slash.
    pub api_host: String,

    /// Application identity used for signing and the `X-APP-ID` header.
    pub app_id: String,

    /// Shared signing secret.
    pub api_secret: String,

    /// Token endpoint path, appended to `api_host`.
    #[serde(default = "default_auth_path")]
    pub auth_path: String,

    /// Fixed per-call network timeout.
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// A cached token is refreshed this long before its advertised expiry.
    #[serde(with = "humantime_serde", default = "default_refresh_skew")]
    pub token_refresh_skew: Duration,
}

impl PartnerConfig {
    pub fn new(
        api_host: impl Into<String>,
        app_id: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        let api_host: String = api_host.into();
        Self {
            api_host: api_host.trim_end_matches('/').to_string(),
            app_id: app_id.into(),
            api_secret: api_secret.into(),
            auth_path: default_auth_path(),
            request_timeout: default_request_timeout(),
            token_refresh_skew: default_refresh_skew(),
        }
    }

    /// Full URL for a partner path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_host.trim_end_matches('/'), path)
    }
}

impl std::fmt::Debug for PartnerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartnerConfig")
            .field("api_host", &self.api_host)
            .field("app_id", &self.app_id)
            .field("api_secret", &"<redacted>")
            .field("auth_path", &self.auth_path)
            .field("request_timeout", &self.request_timeout)
            .field("token_refresh_skew", &self.token_refresh_skew)
            .finish()
    }
}

fn default_auth_path() -> String {
    DEFAULT_AUTH_PATH.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_refresh_skew() -> Duration {
    Duration::from_secs(60)
}

/// Server configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IPC server bind address (TCP).
    pub listen_addr: String,

    /// Caller-facing API key. `None` disables inbound authorization.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:50051".to_string(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("listen_addr", &self.listen_addr)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Lower the default log filter to `debug`.
    pub debug: bool,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

/// IPC transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcConfig {
    /// Maximum frame payload size in bytes.
    pub max_frame_bytes: u32,

    /// Maximum concurrent TCP connections. Connections beyond this limit
    /// are rejected.
    pub max_connections: usize,

    /// Read timeout in seconds per frame. Idle connections are dropped.
    pub read_timeout_secs: u64,

    /// Write timeout in seconds per frame.
    pub write_timeout_secs: u64,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: 5 * 1024 * 1024,
            max_connections: 1000,
            read_timeout_secs: 30,
            write_timeout_secs: 10,
        }
    }
}
