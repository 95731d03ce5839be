//! Machine-readable reason codes carried in verdicts and execution results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reason a command was blocked, or a warning attached to it.
///
/// The string form is the wire code consumers match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonCode {
    // Input validation (hard blocks)
    /// No broker snapshot to evaluate against.
    NoBrokerSnapshot,
    /// Command has no `type`.
    MissingCommandType,
    /// Command `type` is not open / close / modify.
    UnknownCommandType,
    /// Known command type with a malformed payload.
    InvalidCommandPayload,
    /// Equity missing or not positive.
    InvalidEquity,

    // Policy violations (soft blocks)
    /// Daily drawdown at or beyond the limit.
    DailyDrawdownLimitExceeded,
    /// Too many open positions.
    MaxOpenPositionsExceeded,
    /// Too many open positions on one symbol.
    MaxPositionsPerSymbolExceeded,
    /// Estimated risk above the single-trade cap.
    SingleTradeRiskTooHigh,
    /// Stop moved away from a long position's protective side.
    CannotWidenStopLossForLong,
    /// Stop moved away from a short position's protective side.
    CannotWidenStopLossForShort,

    // Warnings
    /// Estimated risk above the warning ratio of the cap.
    SingleTradeRiskNearLimit,
    /// Referenced position is not in the snapshot.
    PositionNotFoundInSnapshot,
    /// Risk could not be estimated.
    CouldNotEstimateRisk,

    // System level
    /// Global trading halt is active.
    GlobalKillSwitchActive,
    /// The session-state provider could not be queried.
    SessionStateUnavailable,
    /// Live auto-execution is disabled by configuration.
    AutoExecuteDisabledEnvVar,
    /// Simulated account could not be read.
    SimSnapshotUnavailable,
    /// A broker call failed.
    ExecutionError,
}

impl ReasonCode {
    /// Wire code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoBrokerSnapshot => "NoBrokerSnapshot",
            Self::MissingCommandType => "MissingCommandType",
            Self::UnknownCommandType => "UnknownCommandType",
            Self::InvalidCommandPayload => "InvalidCommandPayload",
            Self::InvalidEquity => "InvalidEquity",
            Self::DailyDrawdownLimitExceeded => "DailyDrawdownLimitExceeded",
            Self::MaxOpenPositionsExceeded => "MaxOpenPositionsExceeded",
            Self::MaxPositionsPerSymbolExceeded => "MaxPositionsPerSymbolExceeded",
            Self::SingleTradeRiskTooHigh => "SingleTradeRiskTooHigh",
            Self::CannotWidenStopLossForLong => "CannotWidenStopLossForLong",
            Self::CannotWidenStopLossForShort => "CannotWidenStopLossForShort",
            Self::SingleTradeRiskNearLimit => "SingleTradeRiskNearLimit",
            Self::PositionNotFoundInSnapshot => "PositionNotFoundInSnapshot",
            Self::CouldNotEstimateRisk => "CouldNotEstimateRisk",
            Self::GlobalKillSwitchActive => "GLOBAL_KILL_SWITCH_ACTIVE",
            Self::SessionStateUnavailable => "SessionStateUnavailable",
            Self::AutoExecuteDisabledEnvVar => "AutoExecuteDisabledEnvVar",
            Self::SimSnapshotUnavailable => "SimSnapshotUnavailable",
            Self::ExecutionError => "ExecutionError",
        }
    }

    /// Code followed by a detail message, e.g. `ExecutionError: timeout`.
    #[must_use]
    pub fn with_detail(&self, detail: impl fmt::Display) -> String {
        format!("{}: {detail}", self.as_str())
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ReasonCode> for String {
    fn from(code: ReasonCode) -> Self {
        code.as_str().to_string()
    }
}

/// Why a trade's risk could not be estimated. Never blocks by itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskEstimateError {
    /// Equity missing or not positive.
    MissingOrInvalidEquity,
    /// Quantity missing or not positive.
    MissingOrInvalidSize,
    /// Entry price or stop-loss missing.
    MissingEntryOrStopLoss,
    /// Stop is on the wrong side of the entry.
    StopLossNotProtective,
    /// Dual-sided order where neither leg's stop is protective.
    StopLossNotProtectiveForEitherLeg,
    /// Risk value or percent is outside the representable decimal range.
    RiskOutOfRange,
}

impl RiskEstimateError {
    /// Wire code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingOrInvalidEquity => "MissingOrInvalidEquity",
            Self::MissingOrInvalidSize => "MissingOrInvalidSize",
            Self::MissingEntryOrStopLoss => "MissingEntryOrStopLoss",
            Self::StopLossNotProtective => "StopLossNotProtective",
            Self::StopLossNotProtectiveForEitherLeg => "StopLossNotProtectiveForEitherLeg",
            Self::RiskOutOfRange => "RiskOutOfRange",
        }
    }

    /// Warning text: `CouldNotEstimateRisk (<reason>)`.
    #[must_use]
    pub fn as_warning(&self) -> String {
        format!("{} ({})", ReasonCode::CouldNotEstimateRisk, self.as_str())
    }
}

impl fmt::Display for RiskEstimateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_switch_code_is_screaming() {
        assert_eq!(
            ReasonCode::GlobalKillSwitchActive.to_string(),
            "GLOBAL_KILL_SWITCH_ACTIVE"
        );
    }

    #[test]
    fn detail_is_appended() {
        assert_eq!(
            ReasonCode::ExecutionError.with_detail("broker down"),
            "ExecutionError: broker down"
        );
    }

    #[test]
    fn risk_estimate_warning_text() {
        assert_eq!(
            RiskEstimateError::StopLossNotProtective.as_warning(),
            "CouldNotEstimateRisk (StopLossNotProtective)"
        );
    }
}
