//! Desk policy generation parameters.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Parameters for [`DeskPolicyEngine`](crate::domain::desk_policy::DeskPolicyEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskPolicyConfig {
    /// Days of journal history considered for playbook stats.
    pub lookback_days: u32,
    /// Risk per trade (percent) with no losing streak.
    pub base_risk_per_trade: Decimal,
    /// Risk per trade (percent) at a streak of 2 or more.
    pub reduced_risk_per_trade: Decimal,
    /// Daily loss limit in R.
    pub max_daily_loss_r: Decimal,
    /// Daily trade count limit.
    pub max_trades_per_day: u32,
    /// Minimum trades before a playbook can qualify.
    pub min_samples: u32,
    /// Minimum win rate (0..=1) for a playbook to qualify.
    pub min_win_rate: Decimal,
    /// Average R a playbook must exceed to qualify.
    pub min_avg_r: Decimal,
    /// Loss streak at which risk is reduced.
    pub reduce_streak: u32,
    /// Loss streak at which a trading stop is recommended.
    pub stop_streak: u32,
}

impl Default for DeskPolicyConfig {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            base_risk_per_trade: dec!(0.5),
            reduced_risk_per_trade: dec!(0.25),
            max_daily_loss_r: dec!(3),
            max_trades_per_day: 5,
            min_samples: 3,
            min_win_rate: dec!(0.40),
            min_avg_r: dec!(0.2),
            reduce_streak: 2,
            stop_streak: 4,
        }
    }
}
