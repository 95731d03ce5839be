//! Risk Management Domain Services

mod execution_guard;

pub use execution_guard::{ExecutionGuard, RiskEstimate};
