//! Application Use Cases
//!
//! Use cases orchestrate domain logic to fulfill application requirements.

mod execute_trade_command;
mod risk_policy;

pub use execute_trade_command::{ExecutionEngine, ExecutionError, ExecutionSettings};
pub use risk_policy::RiskPolicyUseCase;
