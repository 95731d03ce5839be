//! Live broker gateway configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::broker::live::{LiveBrokerConfig, RetryConfig};

/// Broker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BrokerConfig {
    /// Live broker gateway.
    #[serde(default)]
    pub live: LiveGatewayConfig,
}

/// Connection settings for the live broker gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveGatewayConfig {
    /// Gateway base URL (`LIVE_BROKER_URL`).
    #[serde(default)]
    pub base_url: String,
    /// Bearer token (`LIVE_BROKER_TOKEN`).
    #[serde(default)]
    pub api_token: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Attempts per request, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First retry delay in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

impl LiveGatewayConfig {
    /// Whether both the URL and the token are set.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.api_token.trim().is_empty()
    }

    /// Adapter configuration for [`HttpLiveBroker`](crate::infrastructure::broker::HttpLiveBroker).
    #[must_use]
    pub fn to_adapter_config(&self) -> LiveBrokerConfig {
        LiveBrokerConfig::new(self.base_url.trim(), self.api_token.trim())
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_retry(RetryConfig {
                max_attempts: self.max_attempts,
                initial_backoff: Duration::from_millis(self.initial_backoff_ms),
                ..RetryConfig::default()
            })
    }
}

impl Default for LiveGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            timeout_ms: default_timeout_ms(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    100
}
