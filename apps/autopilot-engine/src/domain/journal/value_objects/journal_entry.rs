//! Closed trade record.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::shared::{JournalEntryId, Symbol, lenient_decimal};

/// Outcome label on a closed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeOutcome {
    /// Profitable trade.
    #[serde(alias = "WIN", alias = "Win")]
    Win,
    /// Losing trade.
    #[serde(alias = "LOSS", alias = "Loss")]
    Loss,
    /// Flat trade.
    #[serde(alias = "BREAKEVEN", alias = "Breakeven", alias = "be")]
    Breakeven,
}

impl fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Win => write!(f, "win"),
            Self::Loss => write!(f, "loss"),
            Self::Breakeven => write!(f, "breakeven"),
        }
    }
}

/// A closed trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Entry id.
    #[serde(default = "JournalEntryId::generate")]
    pub id: JournalEntryId,
    /// When the trade was closed.
    pub created_at: DateTime<Utc>,
    /// Realized result in R-multiples.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub result_r: Option<Decimal>,
    /// Outcome label.
    #[serde(default)]
    pub outcome: Option<TradeOutcome>,
    /// Playbook (setup) the trade followed.
    #[serde(default)]
    pub playbook: Option<String>,
    /// Instrument traded.
    #[serde(default)]
    pub symbol: Option<Symbol>,
}

impl JournalEntry {
    /// Create an entry with a realized R result.
    #[must_use]
    pub fn with_result(created_at: DateTime<Utc>, result_r: Decimal) -> Self {
        Self {
            id: JournalEntryId::generate(),
            created_at,
            result_r: Some(result_r),
            outcome: None,
            playbook: None,
            symbol: None,
        }
    }

    /// Create an entry with an outcome label only.
    #[must_use]
    pub fn with_outcome(created_at: DateTime<Utc>, outcome: TradeOutcome) -> Self {
        Self {
            id: JournalEntryId::generate(),
            created_at,
            result_r: None,
            outcome: Some(outcome),
            playbook: None,
            symbol: None,
        }
    }

    /// Tag the playbook.
    #[must_use]
    pub fn playbook(mut self, playbook: impl Into<String>) -> Self {
        self.playbook = Some(playbook.into());
        self
    }

    /// Realized direction: the sign of `result_r` when present, else the outcome label.
    #[must_use]
    pub fn realized_outcome(&self) -> Option<TradeOutcome> {
        match self.result_r {
            Some(r) if r > Decimal::ZERO => Some(TradeOutcome::Win),
            Some(r) if r < Decimal::ZERO => Some(TradeOutcome::Loss),
            Some(_) => Some(TradeOutcome::Breakeven),
            None => self.outcome,
        }
    }

    /// Whether the trade is an explicit loss.
    #[must_use]
    pub fn is_loss(&self) -> bool {
        self.realized_outcome() == Some(TradeOutcome::Loss)
    }

    /// Whether the trade is an explicit win.
    #[must_use]
    pub fn is_win(&self) -> bool {
        self.realized_outcome() == Some(TradeOutcome::Win)
    }

    /// UTC calendar day the trade closed on.
    #[must_use]
    pub fn trade_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}
