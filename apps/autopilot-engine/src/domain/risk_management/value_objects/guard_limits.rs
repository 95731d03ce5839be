//! Execution guard thresholds.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::desk_policy::DeskPolicy;
use crate::domain::risk_management::errors::RiskError;

/// Thresholds the guard enforces on new positions.
///
/// Percentages are in percent units (`4` means 4%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardLimits {
    /// Daily drawdown (percent of balance) at which new trades are blocked.
    pub max_daily_drawdown_percent: Decimal,
    /// Maximum number of open positions after the trade.
    pub max_open_positions: usize,
    /// Maximum open positions on any one symbol after the trade.
    pub max_positions_per_symbol: usize,
    /// Maximum estimated risk of a single trade (percent of equity).
    pub max_single_trade_risk_percent: Decimal,
    /// Fraction of the risk cap above which a warning is attached.
    pub risk_warning_ratio: Decimal,
}

impl Default for GuardLimits {
    fn default() -> Self {
        Self {
            max_daily_drawdown_percent: dec!(4),
            max_open_positions: 5,
            max_positions_per_symbol: 3,
            max_single_trade_risk_percent: dec!(1),
            risk_warning_ratio: dec!(0.75),
        }
    }
}

impl GuardLimits {
    /// Validate the thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`RiskError::InvalidConfiguration`] when a limit is not positive
    /// or the warning ratio is outside `(0, 1]`.
    pub fn validate(&self) -> Result<(), RiskError> {
        if self.max_daily_drawdown_percent <= Decimal::ZERO {
            return Err(RiskError::invalid(
                "max_daily_drawdown_percent",
                "must be positive",
            ));
        }
        if self.max_open_positions == 0 {
            return Err(RiskError::invalid("max_open_positions", "must be positive"));
        }
        if self.max_positions_per_symbol == 0 {
            return Err(RiskError::invalid(
                "max_positions_per_symbol",
                "must be positive",
            ));
        }
        if self.max_single_trade_risk_percent <= Decimal::ZERO {
            return Err(RiskError::invalid(
                "max_single_trade_risk_percent",
                "must be positive",
            ));
        }
        if self.risk_warning_ratio <= Decimal::ZERO || self.risk_warning_ratio > Decimal::ONE {
            return Err(RiskError::invalid(
                "risk_warning_ratio",
                "must be in (0, 1]",
            ));
        }
        Ok(())
    }

    /// Limits with the single-trade risk cap lowered to the policy's
    /// `max_risk_per_trade` when that is stricter.
    #[must_use]
    pub fn tightened_by(&self, policy: &DeskPolicy) -> Self {
        Self {
            max_single_trade_risk_percent: self
                .max_single_trade_risk_percent
                .min(policy.max_risk_per_trade.max(Decimal::ZERO)),
            ..self.clone()
        }
    }

    /// Risk percent above which a near-limit warning is attached.
    #[must_use]
    pub fn risk_warning_threshold(&self) -> Decimal {
        self.max_single_trade_risk_percent * self.risk_warning_ratio
    }
}
