//! Domain Layer
//!
//! The innermost layer containing business logic with zero infrastructure dependencies.
//! This layer defines:
//!
//! - **Value Objects**: Immutable domain types with equality by value
//! - **Domain Services**: Stateless business logic
//!
//! # Bounded Contexts
//!
//! - [`trading`]: Trade commands and broker snapshots
//! - [`risk_management`]: Execution guard, limits and verdicts
//! - [`journal`]: Closed trades
//! - [`tilt`]: Behavioral risk state and defense modes
//! - [`desk_policy`]: Adaptive daily risk policy

pub mod desk_policy;
pub mod journal;
pub mod risk_management;
pub mod shared;
pub mod tilt;
pub mod trading;
