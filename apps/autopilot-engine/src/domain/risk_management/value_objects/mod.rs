//! Risk Management Value Objects

mod guard_limits;
mod guard_verdict;
mod reason_code;

pub use guard_limits::GuardLimits;
pub use guard_verdict::{GuardMetrics, GuardVerdict};
pub use reason_code::{ReasonCode, RiskEstimateError};
