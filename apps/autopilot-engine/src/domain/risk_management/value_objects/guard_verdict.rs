//! Guard verdict and the metrics computed while reaching it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ReasonCode;

/// Figures the guard computed for a command. Absent figures are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardMetrics {
    /// `dailyPnl / balance * 100`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_drawdown_percent: Option<Decimal>,
    /// Open positions before the command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_positions: Option<usize>,
    /// Positions the command would open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_positions: Option<usize>,
    /// Open positions on the command's symbol before the command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_positions: Option<usize>,
    /// Estimated loss at the stop, in account currency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_value: Option<Decimal>,
    /// Estimated loss at the stop, percent of equity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_percent: Option<Decimal>,
    /// Single-trade risk cap in effect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_cap_percent: Option<Decimal>,
    /// Whether the referenced position exists in the snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_found: Option<bool>,
    /// The position's current stop-loss.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_stop_loss: Option<Decimal>,
    /// The stop-loss the command asks for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_stop_loss: Option<Decimal>,
}

/// Outcome of evaluating one command against one snapshot.
///
/// `hard_blocked` implies `!allowed`. `reasons` explain a block; `warnings`
/// are informational and never change `allowed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardVerdict {
    /// Whether the command may proceed.
    pub allowed: bool,
    /// Whether the block cannot be overridden by confirmation.
    pub hard_blocked: bool,
    /// Reason codes for a block.
    pub reasons: Vec<String>,
    /// Informational warnings.
    pub warnings: Vec<String>,
    /// Computed figures.
    pub metrics: GuardMetrics,
}

impl GuardVerdict {
    /// An allowing verdict with no reasons.
    #[must_use]
    pub fn allow() -> Self {
        Self {
            allowed: true,
            hard_blocked: false,
            reasons: Vec::new(),
            warnings: Vec::new(),
            metrics: GuardMetrics::default(),
        }
    }

    /// A hard-blocking verdict.
    #[must_use]
    pub fn hard_block(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            hard_blocked: true,
            reasons: vec![reason.into()],
            warnings: Vec::new(),
            metrics: GuardMetrics::default(),
        }
    }

    /// Record a soft block.
    pub fn block(&mut self, reason: ReasonCode) {
        self.allowed = false;
        self.reasons.push(reason.into());
    }

    /// Attach a warning.
    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Attach metrics.
    #[must_use]
    pub fn with_metrics(mut self, metrics: GuardMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Whether a block with `code` was recorded.
    #[must_use]
    pub fn has_reason(&self, code: ReasonCode) -> bool {
        self.reasons.iter().any(|r| r == code.as_str())
    }

    /// Whether a warning starting with `code` was recorded.
    #[must_use]
    pub fn has_warning(&self, code: ReasonCode) -> bool {
        self.warnings.iter().any(|w| w.starts_with(code.as_str()))
    }
}
