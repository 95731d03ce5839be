//! Application Ports (Driver and Driven)
//!
//! Ports define interfaces for interacting with external systems.
//! - **Driver Ports** (Primary/Inbound): How the world uses our application
//! - **Driven Ports** (Secondary/Outbound): How our application uses external systems

mod journal_port;
mod live_broker_port;
mod session_state_port;
mod sim_broker_port;

pub use journal_port::{JournalError, JournalPort};
pub use live_broker_port::{
    BrokerError, LiveBrokerPort, ModifyPositionRequest, OrderAck, PlaceOrderRequest, PositionAck,
};
pub use session_state_port::{SessionError, SessionState, SessionStatePort};
pub use sim_broker_port::{OpenSimPositionRequest, SimAccount, SimBrokerPort, SimCloseResult};
