//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer:
//!
//! - **Driven Adapters (Outbound)**
//!   - `broker/`: Live broker gateway client and the simulated broker
//!   - `session/`: Kill switch and session routing state
//!   - `persistence/`: Trade journal storage
//!
//! - **Driver Adapters (Inbound)**
//!   - `http/`: REST API controllers

pub mod broker;
pub mod http;
pub mod persistence;
pub mod session;

pub use session::InMemorySessionState;
