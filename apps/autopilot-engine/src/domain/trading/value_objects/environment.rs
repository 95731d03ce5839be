//! Execution mode and trading environment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the engine may execute on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Evaluate only; a human confirms.
    #[default]
    #[serde(alias = "CONFIRM")]
    Confirm,
    /// Execute when the guard allows.
    #[serde(alias = "AUTO")]
    Auto,
}

impl ExecutionMode {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where orders are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingEnvironment {
    /// Simulated broker.
    #[default]
    #[serde(alias = "SIM", alias = "paper")]
    Sim,
    /// Live broker.
    #[serde(alias = "LIVE")]
    Live,
}

impl TradingEnvironment {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sim => "sim",
            Self::Live => "live",
        }
    }

    /// Whether this is the simulated environment.
    #[must_use]
    pub const fn is_sim(&self) -> bool {
        matches!(self, Self::Sim)
    }
}

impl fmt::Display for TradingEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
