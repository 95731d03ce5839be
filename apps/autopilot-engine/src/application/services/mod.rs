//! Application Services
//!
//! Application services coordinate domain logic and infrastructure adapters.
//! They differ from use cases in that they hold long-lived state shared by
//! several use cases.

mod broker_state_store;

pub use broker_state_store::{BrokerStateStore, SnapshotSubscriber, SubscriptionId};
