//! Static configuration that cannot be changed at runtime.
//! These settings affect server binding or require restart to change.

use serde::Deserialize;

/// Static configuration that cannot be changed at runtime
/// These settings affect server binding or require restart to change
#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_limits")]
    pub limits: LimitsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Request size limits
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum JSON body size; images arrive base64-encoded inside the body
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            limits: default_limits(),
        }
    }
}

// ==================== Default Value Functions ====================

pub(crate) fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8080
}

pub(crate) fn default_limits() -> LimitsConfig {
    LimitsConfig {
        max_request_bytes: default_max_request_bytes(),
    }
}

pub(crate) fn default_max_request_bytes() -> usize {
    32 * 1024 * 1024
}
