//! Server configuration for the HTTP API and the metrics listener.

use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server port for the REST API (/health, /api/v1/*).
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Prometheus exporter port (/metrics).
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            metrics_port: default_metrics_port(),
            bind_address: default_bind_address(),
        }
    }
}

pub(crate) const fn default_http_port() -> u16 {
    8080
}

pub(crate) const fn default_metrics_port() -> u16 {
    9090
}

pub(crate) fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
