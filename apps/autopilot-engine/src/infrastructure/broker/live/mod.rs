//! Live Broker Adapter
//!
//! `LiveBrokerPort` over a JSON HTTP gateway with:
//! - Bearer token auth
//! - Retry with jittered exponential backoff on 408/429/5xx
//! - Descriptive, non-retried errors for other 4xx responses

mod adapter;
mod config;
mod error;
mod http_client;

pub use adapter::HttpLiveBroker;
pub use config::{LiveBrokerConfig, RetryConfig};
pub use error::LiveBrokerError;
