//! Per-playbook performance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Performance of one playbook over the lookback window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybookStats {
    /// Playbook name (`unassigned` for untagged trades).
    pub playbook: String,
    /// Closed trades.
    pub samples: u32,
    /// Winning trades.
    pub wins: u32,
    /// `wins / samples`, 0..=1.
    pub win_rate: Decimal,
    /// Mean R over trades with a recorded result.
    pub avg_r: Decimal,
}
