//! Broker account snapshot.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PositionSide;
use crate::domain::shared::{PositionId, Symbol, lenient_decimal};

/// An open position as the broker reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Broker position id.
    pub id: PositionId,
    /// Instrument.
    pub symbol: Symbol,
    /// Long or short.
    pub side: PositionSide,
    /// Position size.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub size: Option<Decimal>,
    /// Average entry price.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub entry_price: Option<Decimal>,
    /// Current stop-loss, if one is set.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub stop_loss: Option<Decimal>,
    /// Current take-profit, if one is set.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub take_profit: Option<Decimal>,
    /// Unrealized P&L in account currency.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub unrealized_pnl: Option<Decimal>,
}

impl Position {
    /// Create a position with size and entry price.
    #[must_use]
    pub fn new(
        id: impl Into<PositionId>,
        symbol: impl Into<Symbol>,
        side: PositionSide,
        size: Decimal,
        entry_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            side,
            size: Some(size),
            entry_price: Some(entry_price),
            stop_loss: None,
            take_profit: None,
            unrealized_pnl: None,
        }
    }

    /// Set the stop-loss.
    #[must_use]
    pub const fn with_stop_loss(mut self, stop_loss: Decimal) -> Self {
        self.stop_loss = Some(stop_loss);
        self
    }

    /// Set the unrealized P&L.
    #[must_use]
    pub const fn with_unrealized_pnl(mut self, pnl: Decimal) -> Self {
        self.unrealized_pnl = Some(pnl);
        self
    }
}

/// Point-in-time read of the account.
///
/// Snapshots are immutable values. The live store replaces its snapshot
/// wholesale on every update and never edits one in place.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerSnapshot {
    /// Account equity.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub equity: Option<Decimal>,
    /// Account balance.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub balance: Option<Decimal>,
    /// Realized P&L for the current trading day.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub daily_pnl: Option<Decimal>,
    /// Open positions.
    #[serde(default)]
    pub open_positions: Vec<Position>,
    /// When the broker produced the snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,
}

impl BrokerSnapshot {
    /// Create a snapshot with equity and balance and no positions.
    #[must_use]
    pub const fn new(equity: Decimal, balance: Decimal) -> Self {
        Self {
            equity: Some(equity),
            balance: Some(balance),
            daily_pnl: None,
            open_positions: Vec::new(),
            captured_at: None,
        }
    }

    /// Set the daily P&L.
    #[must_use]
    pub const fn with_daily_pnl(mut self, daily_pnl: Decimal) -> Self {
        self.daily_pnl = Some(daily_pnl);
        self
    }

    /// Add an open position.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.open_positions.push(position);
        self
    }

    /// Stamp the capture time.
    #[must_use]
    pub const fn captured_at(mut self, at: DateTime<Utc>) -> Self {
        self.captured_at = Some(at);
        self
    }

    /// Number of open positions on `symbol`.
    #[must_use]
    pub fn positions_for(&self, symbol: &Symbol) -> usize {
        self.open_positions
            .iter()
            .filter(|p| &p.symbol == symbol)
            .count()
    }

    /// Look up an open position by id.
    #[must_use]
    pub fn find_position(&self, id: &PositionId) -> Option<&Position> {
        self.open_positions.iter().find(|p| &p.id == id)
    }
}
