//! Tilt Service
//!
//! Derives the behavioral risk state from the day's closed trades.
//!
//! # State Mapping (most severe first)
//!
//! | Condition                          | Risk state  | Defense mode |
//! |------------------------------------|-------------|--------------|
//! | dailyR <= -3 or streak >= 5        | `lockdown`  | `lockdown`   |
//! | streak >= 4                        | `tilt_risk` | `defense`    |
//! | streak >= 2                        | `hot`       | `caution`    |
//! | streak >= 1                        | `warming`   | `normal`     |
//! | otherwise                          | `normal`    | `normal`     |

use rust_decimal::Decimal;

use crate::domain::desk_policy::{DeskPolicy, PolicyMode};
use crate::domain::journal::JournalEntry;
use crate::domain::tilt::value_objects::{
    DefenseMode, RiskState, TiltConfig, TiltSignal, TiltSignalKind, TiltState,
};
use crate::domain::trading::BrokerSnapshot;

/// Tilt Service - behavioral risk detection.
#[derive(Debug, Clone, Default)]
pub struct TiltService {
    config: TiltConfig,
}

impl TiltService {
    /// Create a service with the given thresholds.
    #[must_use]
    pub const fn new(config: TiltConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use.
    #[must_use]
    pub const fn config(&self) -> &TiltConfig {
        &self.config
    }

    /// Evaluate today's closed trades (any order) and the live snapshot.
    #[must_use]
    pub fn evaluate(&self, entries: &[JournalEntry], snapshot: Option<&BrokerSnapshot>) -> TiltState {
        let mut ordered: Vec<&JournalEntry> = entries.iter().collect();
        ordered.sort_by_key(|e| e.created_at);

        let loss_streak = Self::loss_streak(&ordered);
        let daily_r = ordered
            .iter()
            .filter_map(|e| e.result_r)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        let trades_today = ordered.len();

        let mut tilt_signals = Vec::new();
        if loss_streak >= self.config.rapid_loss_streak {
            tilt_signals.push(TiltSignal {
                kind: TiltSignalKind::RapidLosses,
                message: format!("{loss_streak} consecutive losses"),
            });
        }
        if daily_r <= self.config.session_drawdown_r {
            tilt_signals.push(TiltSignal {
                kind: TiltSignalKind::SessionDdHit,
                message: format!(
                    "Daily result {}R at or below {}R",
                    daily_r.normalize(),
                    self.config.session_drawdown_r.normalize()
                ),
            });
        }
        if trades_today > self.config.overtrading_limit {
            tilt_signals.push(TiltSignal {
                kind: TiltSignalKind::Overtrading,
                message: format!(
                    "{trades_today} trades today, limit {}",
                    self.config.overtrading_limit
                ),
            });
        }

        let (risk_state, defense_mode) = self.classify(loss_streak, daily_r);

        TiltState {
            risk_state,
            defense_mode,
            tilt_signals,
            loss_streak,
            daily_r,
            trades_today,
            daily_pnl: snapshot.and_then(|s| s.daily_pnl),
            open_positions: snapshot.map(|s| s.open_positions.len()),
        }
    }

    /// Consecutive losses counted back from the newest trade.
    ///
    /// Only explicit losses count and only explicit wins end the streak;
    /// breakeven or unlabeled trades are skipped.
    fn loss_streak(ordered: &[&JournalEntry]) -> u32 {
        let mut streak = 0;
        for entry in ordered.iter().rev() {
            if entry.is_win() {
                break;
            }
            if entry.is_loss() {
                streak += 1;
            }
        }
        streak
    }

    fn classify(&self, loss_streak: u32, daily_r: Decimal) -> (RiskState, DefenseMode) {
        let c = &self.config;
        if daily_r <= c.session_drawdown_r || loss_streak >= c.lockdown_streak {
            (RiskState::Lockdown, DefenseMode::Lockdown)
        } else if loss_streak >= c.tilt_risk_streak {
            (RiskState::TiltRisk, DefenseMode::Defense)
        } else if loss_streak >= c.rapid_loss_streak {
            (RiskState::Hot, DefenseMode::Caution)
        } else if loss_streak >= c.warming_streak {
            (RiskState::Warming, DefenseMode::Normal)
        } else {
            (RiskState::Normal, DefenseMode::Normal)
        }
    }

    /// Return a copy of `policy` adjusted for `mode`. The input is untouched.
    #[must_use]
    pub fn apply_defense_mode(&self, policy: &DeskPolicy, mode: DefenseMode) -> DeskPolicy {
        let mut adjusted = policy.clone();
        match mode {
            DefenseMode::Normal => {}
            DefenseMode::Caution => {
                adjusted.max_risk_per_trade =
                    adjusted.max_risk_per_trade.min(self.config.caution_risk_cap);
                adjusted.notes.push(format!(
                    "Caution mode: risk per trade capped at {}%",
                    self.config.caution_risk_cap.normalize()
                ));
            }
            DefenseMode::Defense => {
                adjusted.max_risk_per_trade = Decimal::ZERO;
                adjusted.mode = PolicyMode::Enforced;
                adjusted
                    .notes
                    .push("Defense mode: new risk disabled until the streak resets".to_string());
            }
            DefenseMode::Lockdown => {
                adjusted.max_risk_per_trade = Decimal::ZERO;
                adjusted.mode = PolicyMode::Enforced;
                adjusted
                    .notes
                    .push("Lockdown: no new trades for the rest of the session".to_string());
            }
        }
        adjusted
    }
}
