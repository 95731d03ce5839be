//! Desk Policy Engine
//!
//! Builds the day's policy from journal history:
//!
//! 1. Group closed trades in the lookback window by playbook.
//! 2. Allow-list the green playbooks (enough samples, win rate, average R),
//!    or `*` when none qualify.
//! 3. Size risk by the current loss streak: base, reduced, or zero.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::domain::desk_policy::value_objects::{
    AllowedPlaybooks, DeskPolicy, DeskPolicyConfig, PlaybookStats, PolicyMode,
};
use crate::domain::journal::JournalEntry;

/// Group name for trades with no playbook tag.
pub const UNASSIGNED_PLAYBOOK: &str = "unassigned";

/// Desk Policy Engine - generates the adaptive daily policy.
#[derive(Debug, Clone, Default)]
pub struct DeskPolicyEngine {
    config: DeskPolicyConfig,
}

impl DeskPolicyEngine {
    /// Create an engine with the given parameters.
    #[must_use]
    pub const fn new(config: DeskPolicyConfig) -> Self {
        Self { config }
    }

    /// Parameters in use.
    #[must_use]
    pub const fn config(&self) -> &DeskPolicyConfig {
        &self.config
    }

    /// First day of the lookback window ending on `date`.
    #[must_use]
    pub fn lookback_start(&self, date: NaiveDate) -> NaiveDate {
        date.checked_sub_days(Days::new(u64::from(self.config.lookback_days)))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Per-playbook stats over the entries inside the lookback window ending on `date`.
    #[must_use]
    pub fn playbook_stats(&self, date: NaiveDate, entries: &[JournalEntry]) -> Vec<PlaybookStats> {
        let start = self.lookback_start(date);

        #[derive(Default)]
        struct Tally {
            samples: u32,
            wins: u32,
            r_sum: Decimal,
            r_count: u32,
        }

        let mut groups: BTreeMap<&str, Tally> = BTreeMap::new();
        for entry in entries {
            let day = entry.trade_date();
            if day < start || day > date {
                continue;
            }
            let name = entry
                .playbook
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .unwrap_or(UNASSIGNED_PLAYBOOK);
            let tally = groups.entry(name).or_default();
            tally.samples += 1;
            if entry.is_win() {
                tally.wins += 1;
            }
            if let Some(r) = entry.result_r {
                tally.r_sum = tally.r_sum.saturating_add(r);
                tally.r_count += 1;
            }
        }

        groups
            .into_iter()
            .map(|(name, tally)| PlaybookStats {
                playbook: name.to_string(),
                samples: tally.samples,
                wins: tally.wins,
                win_rate: ratio(tally.wins, tally.samples),
                avg_r: if tally.r_count == 0 {
                    Decimal::ZERO
                } else {
                    tally.r_sum / Decimal::from(tally.r_count)
                },
            })
            .collect()
    }

    /// Whether a playbook qualifies for the allow-list.
    #[must_use]
    pub fn is_green(&self, stats: &PlaybookStats) -> bool {
        stats.playbook != UNASSIGNED_PLAYBOOK
            && stats.samples >= self.config.min_samples
            && stats.win_rate >= self.config.min_win_rate
            && stats.avg_r > self.config.min_avg_r
    }

    /// Generate the policy for `date`.
    #[must_use]
    pub fn generate(&self, date: NaiveDate, entries: &[JournalEntry], loss_streak: u32) -> DeskPolicy {
        let stats = self.playbook_stats(date, entries);
        let green: Vec<String> = stats
            .iter()
            .filter(|s| self.is_green(s))
            .map(|s| s.playbook.clone())
            .collect();

        let mut notes = Vec::new();
        let allowed_playbooks = if green.is_empty() {
            notes.push(format!(
                "No playbook met the green bar ({}+ trades, win rate >= {}%, avg R > {}) in the last {} days",
                self.config.min_samples,
                (self.config.min_win_rate * Decimal::ONE_HUNDRED).normalize(),
                self.config.min_avg_r.normalize(),
                self.config.lookback_days,
            ));
            AllowedPlaybooks::Any
        } else {
            notes.push(format!("Green playbooks: {}", green.join(", ")));
            AllowedPlaybooks::Only(green)
        };

        let (mode, max_risk_per_trade) = if loss_streak >= self.config.stop_streak {
            notes.push(format!(
                "Loss streak of {loss_streak}: trading stop recommended, risk set to 0%"
            ));
            (PolicyMode::Stopped, Decimal::ZERO)
        } else if loss_streak >= self.config.reduce_streak {
            notes.push(format!(
                "Loss streak of {loss_streak}: risk reduced to {}%",
                self.config.reduced_risk_per_trade.normalize()
            ));
            (PolicyMode::Reduced, self.config.reduced_risk_per_trade)
        } else {
            (PolicyMode::Standard, self.config.base_risk_per_trade)
        };

        DeskPolicy {
            date,
            mode,
            max_risk_per_trade,
            max_daily_loss_r: self.config.max_daily_loss_r,
            max_trades_per_day: self.config.max_trades_per_day,
            allowed_playbooks,
            notes,
        }
    }
}

fn ratio(numerator: u32, denominator: u32) -> Decimal {
    if denominator == 0 {
        Decimal::ZERO
    } else {
        Decimal::from(numerator) / Decimal::from(denominator)
    }
}
