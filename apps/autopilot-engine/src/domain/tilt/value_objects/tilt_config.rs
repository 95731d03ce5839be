//! Tilt detection thresholds.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Thresholds for [`TiltService`](crate::domain::tilt::TiltService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    /// Trades per day above which `overtrading` fires.
    pub overtrading_limit: usize,
    /// Loss streak at which `rapid_losses` fires.
    pub rapid_loss_streak: u32,
    /// Daily R at or below which `session_dd_hit` fires and the day locks down.
    pub session_drawdown_r: Decimal,
    /// Loss streak that locks the day down.
    pub lockdown_streak: u32,
    /// Loss streak that puts the desk in defense.
    pub tilt_risk_streak: u32,
    /// Loss streak that marks the desk as warming.
    pub warming_streak: u32,
    /// Risk-per-trade cap (percent) in caution mode.
    pub caution_risk_cap: Decimal,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            overtrading_limit: 5,
            rapid_loss_streak: 2,
            session_drawdown_r: dec!(-3),
            lockdown_streak: 5,
            tilt_risk_streak: 4,
            warming_streak: 1,
            caution_risk_cap: dec!(0.25),
        }
    }
}
