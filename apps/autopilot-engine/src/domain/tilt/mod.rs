//! Tilt Bounded Context
//!
//! Detects behavioral risk (losing streaks, overtrading, session drawdown)
//! and maps it to a defense mode that tightens the desk policy.

pub mod services;
pub mod value_objects;

pub use services::TiltService;
pub use value_objects::{DefenseMode, RiskState, TiltConfig, TiltSignal, TiltSignalKind, TiltState};
