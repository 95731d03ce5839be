//! In-memory simulated broker.

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::application::ports::{
    BrokerError, OpenSimPositionRequest, SimAccount, SimBrokerPort, SimCloseResult,
};
use crate::domain::shared::{PositionId, Symbol};
use crate::domain::trading::{Position, PositionSide};

#[derive(Debug)]
struct Ledger {
    balance: Decimal,
    realized_today: Decimal,
    positions: Vec<Position>,
    next_id: u64,
}

/// In-memory implementation of `SimBrokerPort`.
///
/// Positions fill at the requested entry price. Equity is balance plus the
/// unrealized P&L last marked with [`InMemorySimBroker::mark_price`].
#[derive(Debug)]
pub struct InMemorySimBroker {
    ledger: RwLock<Ledger>,
}

impl Default for InMemorySimBroker {
    fn default() -> Self {
        Self::new(Decimal::new(10_000, 0))
    }
}

impl InMemorySimBroker {
    /// Create an account with a starting balance and no positions.
    #[must_use]
    pub fn new(starting_balance: Decimal) -> Self {
        Self {
            ledger: RwLock::new(Ledger {
                balance: starting_balance,
                realized_today: Decimal::ZERO,
                positions: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Number of open positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ledger.read().positions.len()
    }

    /// Check if there are no open positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ledger.read().positions.is_empty()
    }

    /// Revalue every open position on `symbol` at `price`.
    pub fn mark_price(&self, symbol: &Symbol, price: Decimal) {
        let mut ledger = self.ledger.write();
        for position in ledger.positions.iter_mut().filter(|p| &p.symbol == symbol) {
            position.unrealized_pnl = pnl(position, price);
            if position.unrealized_pnl.is_none() {
                tracing::warn!(position_id = %position.id, %price, "Sim mark out of range");
            }
        }
    }

    /// Reset realized daily P&L, e.g. at the session roll.
    pub fn start_new_day(&self) {
        self.ledger.write().realized_today = Decimal::ZERO;
    }
}

/// `None` when the P&L is outside the decimal range.
fn pnl(position: &Position, price: Decimal) -> Option<Decimal> {
    let entry = position.entry_price.unwrap_or(price);
    let size = position.size.unwrap_or_default();
    let move_per_unit = match position.side {
        PositionSide::Long => price.checked_sub(entry),
        PositionSide::Short => entry.checked_sub(price),
    }?;
    move_per_unit.checked_mul(size)
}

fn not_found(position_id: &PositionId) -> BrokerError {
    BrokerError::PositionNotFound {
        position_id: position_id.to_string(),
    }
}

#[async_trait]
impl SimBrokerPort for InMemorySimBroker {
    async fn get_sim_account(&self) -> Result<SimAccount, BrokerError> {
        let ledger = self.ledger.read();
        let unrealized = ledger
            .positions
            .iter()
            .filter_map(|p| p.unrealized_pnl)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        Ok(SimAccount {
            equity: ledger.balance.saturating_add(unrealized),
            balance: ledger.balance,
            daily_pnl: ledger.realized_today,
        })
    }

    async fn get_sim_positions(&self) -> Result<Vec<Position>, BrokerError> {
        Ok(self.ledger.read().positions.clone())
    }

    async fn open_sim_position(
        &self,
        request: OpenSimPositionRequest,
    ) -> Result<Position, BrokerError> {
        if request.size <= Decimal::ZERO {
            return Err(BrokerError::OrderRejected {
                reason: format!("size must be positive, got {}", request.size),
            });
        }
        if request.entry_price <= Decimal::ZERO {
            return Err(BrokerError::OrderRejected {
                reason: format!("entry price must be positive, got {}", request.entry_price),
            });
        }

        let mut ledger = self.ledger.write();
        let id = format!("sim-{}", ledger.next_id);
        ledger.next_id += 1;

        let mut position = Position::new(
            id,
            request.symbol,
            request.side,
            request.size,
            request.entry_price,
        )
        .with_unrealized_pnl(Decimal::ZERO);
        position.stop_loss = request.stop_loss;
        position.take_profit = request.take_profit;

        tracing::info!(
            position_id = %position.id,
            symbol = %position.symbol,
            side = %position.side,
            size = %request.size,
            "Sim position opened"
        );
        ledger.positions.push(position.clone());
        Ok(position)
    }

    async fn close_sim_position(
        &self,
        position_id: &PositionId,
        price: Option<Decimal>,
    ) -> Result<SimCloseResult, BrokerError> {
        let mut ledger = self.ledger.write();
        let index = ledger
            .positions
            .iter()
            .position(|p| &p.id == position_id)
            .ok_or_else(|| not_found(position_id))?;

        let close_price = price
            .or(ledger.positions[index].entry_price)
            .unwrap_or_default();
        let settled = pnl(&ledger.positions[index], close_price).and_then(|realized_pnl| {
            Some((
                realized_pnl,
                ledger.balance.checked_add(realized_pnl)?,
                ledger.realized_today.checked_add(realized_pnl)?,
            ))
        });
        let Some((realized_pnl, balance, realized_today)) = settled else {
            return Err(BrokerError::OrderRejected {
                reason: format!("closing {position_id} at {close_price} overflows the account"),
            });
        };

        let position = ledger.positions.remove(index);
        ledger.balance = balance;
        ledger.realized_today = realized_today;

        tracing::info!(%position_id, %close_price, %realized_pnl, "Sim position closed");
        Ok(SimCloseResult {
            position_id: position.id,
            close_price,
            realized_pnl,
        })
    }

    async fn modify_sim_position(
        &self,
        position_id: &PositionId,
        stop_loss: Option<Decimal>,
        take_profit: Option<Decimal>,
    ) -> Result<Position, BrokerError> {
        let mut ledger = self.ledger.write();
        let position = ledger
            .positions
            .iter_mut()
            .find(|p| &p.id == position_id)
            .ok_or_else(|| not_found(position_id))?;
        if stop_loss.is_some() {
            position.stop_loss = stop_loss;
        }
        if take_profit.is_some() {
            position.take_profit = take_profit;
        }
        Ok(position.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn open(side: PositionSide, size: Decimal, price: Decimal) -> OpenSimPositionRequest {
        OpenSimPositionRequest {
            symbol: Symbol::new("EURUSD"),
            side,
            size,
            entry_price: price,
            stop_loss: None,
            take_profit: None,
        }
    }

    #[tokio::test]
    async fn open_assigns_sequential_ids() {
        let broker = InMemorySimBroker::default();
        let a = broker
            .open_sim_position(open(PositionSide::Long, dec!(1), dec!(100)))
            .await
            .unwrap();
        let b = broker
            .open_sim_position(open(PositionSide::Short, dec!(1), dec!(100)))
            .await
            .unwrap();

        assert_eq!(a.id.as_str(), "sim-1");
        assert_eq!(b.id.as_str(), "sim-2");
        assert_eq!(broker.len(), 2);
    }

    #[tokio::test]
    async fn open_rejects_non_positive_size() {
        let broker = InMemorySimBroker::default();
        let err = broker
            .open_sim_position(open(PositionSide::Long, dec!(0), dec!(100)))
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::OrderRejected { .. }));
        assert!(broker.is_empty());
    }

    #[tokio::test]
    async fn close_at_price_realizes_pnl() {
        let broker = InMemorySimBroker::new(dec!(10000));
        let short = broker
            .open_sim_position(open(PositionSide::Short, dec!(10), dec!(100)))
            .await
            .unwrap();

        let close = broker
            .close_sim_position(&short.id, Some(dec!(97)))
            .await
            .unwrap();
        assert_eq!(close.realized_pnl, dec!(30));

        let account = broker.get_sim_account().await.unwrap();
        assert_eq!(account.balance, dec!(10030));
        assert_eq!(account.daily_pnl, dec!(30));
        assert!(broker.is_empty());
    }

    #[tokio::test]
    async fn overflowing_close_is_rejected_and_keeps_position() {
        let broker = InMemorySimBroker::new(dec!(10000));
        let long = broker
            .open_sim_position(open(PositionSide::Long, dec!(1000000000000000), dec!(1)))
            .await
            .unwrap();

        let err = broker
            .close_sim_position(&long.id, Some(dec!(1000000000000000)))
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::OrderRejected { .. }));
        assert_eq!(broker.len(), 1);
        assert_eq!(broker.get_sim_account().await.unwrap().balance, dec!(10000));
    }

    #[tokio::test]
    async fn extreme_marks_do_not_break_account() {
        let broker = InMemorySimBroker::new(dec!(10000));
        let symbol = Symbol::new("EURUSD");
        for _ in 0..2 {
            broker
                .open_sim_position(open(PositionSide::Long, dec!(1000000000000000), dec!(1)))
                .await
                .unwrap();
        }

        broker.mark_price(&symbol, dec!(45000000000000));
        let account = broker.get_sim_account().await.unwrap();
        assert_eq!(account.equity, Decimal::MAX);

        broker.mark_price(&symbol, dec!(1000000000000000));
        let positions = broker.get_sim_positions().await.unwrap();
        assert!(positions.iter().all(|p| p.unrealized_pnl.is_none()));
        assert_eq!(broker.get_sim_account().await.unwrap().equity, dec!(10000));
    }

    #[tokio::test]
    async fn new_day_resets_realized_pnl_only() {
        let broker = InMemorySimBroker::new(dec!(10000));
        let long = broker
            .open_sim_position(open(PositionSide::Long, dec!(2), dec!(50)))
            .await
            .unwrap();
        broker
            .close_sim_position(&long.id, Some(dec!(45)))
            .await
            .unwrap();

        broker.start_new_day();

        let account = broker.get_sim_account().await.unwrap();
        assert_eq!(account.daily_pnl, Decimal::ZERO);
        assert_eq!(account.balance, dec!(9990));
    }

    #[tokio::test]
    async fn close_without_price_is_flat() {
        let broker = InMemorySimBroker::default();
        let long = broker
            .open_sim_position(open(PositionSide::Long, dec!(1), dec!(100)))
            .await
            .unwrap();

        let close = broker.close_sim_position(&long.id, None).await.unwrap();
        assert_eq!(close.close_price, dec!(100));
        assert_eq!(close.realized_pnl, Decimal::ZERO);
    }

    #[tokio::test]
    async fn mark_price_moves_equity() {
        let broker = InMemorySimBroker::new(dec!(1000));
        broker
            .open_sim_position(open(PositionSide::Long, dec!(2), dec!(100)))
            .await
            .unwrap();
        broker.mark_price(&Symbol::new("EURUSD"), dec!(95));

        let account = broker.get_sim_account().await.unwrap();
        assert_eq!(account.equity, dec!(990));
        assert_eq!(account.balance, dec!(1000));
    }

    #[tokio::test]
    async fn modify_keeps_unspecified_levels() {
        let broker = InMemorySimBroker::default();
        let mut request = open(PositionSide::Long, dec!(1), dec!(100));
        request.take_profit = Some(dec!(110));
        let position = broker.open_sim_position(request).await.unwrap();

        let modified = broker
            .modify_sim_position(&position.id, Some(dec!(98)), None)
            .await
            .unwrap();
        assert_eq!(modified.stop_loss, Some(dec!(98)));
        assert_eq!(modified.take_profit, Some(dec!(110)));
    }

    #[tokio::test]
    async fn unknown_position_is_not_found() {
        let broker = InMemorySimBroker::default();
        let err = broker
            .close_sim_position(&PositionId::new("nope"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::PositionNotFound { .. }));
    }
}
