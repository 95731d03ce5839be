//! Broker Adapters
//!
//! Implementations of `LiveBrokerPort` and `SimBrokerPort`.

pub mod live;
pub mod sim;

pub use live::{HttpLiveBroker, LiveBrokerConfig, LiveBrokerError, RetryConfig};
pub use sim::InMemorySimBroker;
