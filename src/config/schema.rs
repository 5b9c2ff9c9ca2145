//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::net::{AddrParseError, SocketAddr};

use serde::{Deserialize, Serialize};

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend pool, in rotation order.
    pub backends: Vec<BackendConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            backends: vec![
                BackendConfig::new("https://www.facebook.com"),
                BackendConfig::new("https://www.bing.com"),
                BackendConfig::new("https://www.google.com"),
            ],
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8081").
    pub bind_address: String,
}

impl ListenerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_address.parse()
    }

    /// Keep the bind host, replace the port.
    pub fn set_port(&mut self, port: u16) -> Result<(), AddrParseError> {
        let mut addr = self.socket_addr()?;
        addr.set_port(port);
        self.bind_address = addr.to_string();
        Ok(())
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8081".to_string(),
        }
    }
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Absolute upstream URL (e.g., "http://10.0.0.1:3000").
    pub address: String,

    /// Whether the backend starts in rotation (default: true).
    #[serde(default = "default_alive")]
    pub alive: bool,
}

impl BackendConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            alive: true,
        }
    }
}

fn default_alive() -> bool {
    true
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Wait for upstream response headers, in seconds. 0 disables the limit.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log line format.
    pub log_format: LogFormat,

    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            default_filter: "rr_proxy=info,tower_http=info".to_string(),
        }
    }
}
