//! Tilt Value Objects

mod tilt_config;
mod tilt_state;

pub use tilt_config::TiltConfig;
pub use tilt_state::{DefenseMode, RiskState, TiltSignal, TiltSignalKind, TiltState};
