//! Behavioral risk state derived from the day's trades.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Behavioral risk level, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskState {
    /// No losing streak.
    Normal,
    /// One loss.
    Warming,
    /// Short losing streak.
    Hot,
    /// Long losing streak.
    TiltRisk,
    /// Stop trading for the day.
    Lockdown,
}

impl fmt::Display for RiskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::Warming => "warming",
            Self::Hot => "hot",
            Self::TiltRisk => "tilt_risk",
            Self::Lockdown => "lockdown",
        };
        f.write_str(name)
    }
}

/// Policy adjustment that goes with a risk state, least to most restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseMode {
    /// No adjustment.
    Normal,
    /// Cap risk per trade.
    Caution,
    /// Zero risk, enforced.
    Defense,
    /// Zero risk, enforced, day over.
    Lockdown,
}

impl fmt::Display for DefenseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::Caution => "caution",
            Self::Defense => "defense",
            Self::Lockdown => "lockdown",
        };
        f.write_str(name)
    }
}

/// Kind of tilt signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiltSignalKind {
    /// Consecutive losses at or above the rapid-loss streak.
    RapidLosses,
    /// Session drawdown in R hit.
    SessionDdHit,
    /// More trades than the daily limit.
    Overtrading,
}

/// One reason the tilt state escalated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiltSignal {
    /// Signal kind.
    #[serde(rename = "type")]
    pub kind: TiltSignalKind,
    /// Human-readable detail.
    pub message: String,
}

/// Derived behavioral state. Recomputed per request, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiltState {
    /// Risk level.
    pub risk_state: RiskState,
    /// Matching policy adjustment.
    pub defense_mode: DefenseMode,
    /// Signals that fired.
    pub tilt_signals: Vec<TiltSignal>,
    /// Consecutive losses ending at the latest trade.
    pub loss_streak: u32,
    /// Sum of realized R today.
    pub daily_r: Decimal,
    /// Trades closed today.
    pub trades_today: usize,
    /// Daily P&L from the live snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_pnl: Option<Decimal>,
    /// Open positions in the live snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_positions: Option<usize>,
}

impl TiltState {
    /// Whether a signal of `kind` fired.
    #[must_use]
    pub fn has_signal(&self, kind: TiltSignalKind) -> bool {
        self.tilt_signals.iter().any(|s| s.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(RiskState::Normal < RiskState::Warming);
        assert!(RiskState::TiltRisk < RiskState::Lockdown);
        assert!(DefenseMode::Caution < DefenseMode::Defense);
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&RiskState::TiltRisk).unwrap(),
            "\"tilt_risk\""
        );
        assert_eq!(
            serde_json::to_string(&TiltSignalKind::SessionDdHit).unwrap(),
            "\"session_dd_hit\""
        );
    }
}
