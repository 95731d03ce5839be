//! Simulated Broker Port (Driven Port)
//!
//! Interface for the paper-trading account.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BrokerError;
use crate::domain::shared::{PositionId, Symbol};
use crate::domain::trading::{BrokerSnapshot, Position, PositionSide};

/// Simulated account balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimAccount {
    /// Equity (balance plus unrealized P&L).
    pub equity: Decimal,
    /// Cash balance.
    pub balance: Decimal,
    /// Realized P&L today.
    pub daily_pnl: Decimal,
}

impl SimAccount {
    /// Combine with positions into the canonical snapshot shape.
    #[must_use]
    pub fn into_snapshot(self, positions: Vec<Position>) -> BrokerSnapshot {
        BrokerSnapshot {
            equity: Some(self.equity),
            balance: Some(self.balance),
            daily_pnl: Some(self.daily_pnl),
            open_positions: positions,
            captured_at: Some(chrono::Utc::now()),
        }
    }
}

/// Request to open a simulated position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSimPositionRequest {
    /// Instrument.
    pub symbol: Symbol,
    /// Long or short.
    pub side: PositionSide,
    /// Size.
    pub size: Decimal,
    /// Fill price.
    pub entry_price: Decimal,
    /// Stop-loss.
    pub stop_loss: Option<Decimal>,
    /// Take-profit.
    pub take_profit: Option<Decimal>,
}

/// Result of closing a simulated position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimCloseResult {
    /// Closed position.
    pub position_id: PositionId,
    /// Price the position closed at.
    pub close_price: Decimal,
    /// P&L realized into the balance.
    pub realized_pnl: Decimal,
}

/// Port for the simulated broker.
#[async_trait]
pub trait SimBrokerPort: Send + Sync {
    /// Account balances.
    async fn get_sim_account(&self) -> Result<SimAccount, BrokerError>;

    /// Open positions.
    async fn get_sim_positions(&self) -> Result<Vec<Position>, BrokerError>;

    /// Open a position.
    async fn open_sim_position(
        &self,
        request: OpenSimPositionRequest,
    ) -> Result<Position, BrokerError>;

    /// Close a position at `price`, or at its entry when `None`.
    async fn close_sim_position(
        &self,
        position_id: &PositionId,
        price: Option<Decimal>,
    ) -> Result<SimCloseResult, BrokerError>;

    /// Move a position's stop-loss and/or take-profit.
    async fn modify_sim_position(
        &self,
        position_id: &PositionId,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
    ) -> Result<Position, BrokerError>;
}
