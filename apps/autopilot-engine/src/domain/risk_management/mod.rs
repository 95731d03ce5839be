//! Risk Management Bounded Context
//!
//! Judges trade commands against the account before they reach a broker.
//!
//! # Key Concepts
//!
//! - **Guard Limits**: drawdown, position-count and single-trade risk thresholds
//! - **Guard Verdict**: allow / soft block / hard block, with reasons and warnings
//! - **Risk Estimate**: loss at the stop as a percent of equity, per leg for dual-sided orders

pub mod errors;
pub mod services;
pub mod value_objects;

pub use errors::RiskError;
pub use services::{ExecutionGuard, RiskEstimate};
pub use value_objects::{GuardLimits, GuardMetrics, GuardVerdict, ReasonCode, RiskEstimateError};
