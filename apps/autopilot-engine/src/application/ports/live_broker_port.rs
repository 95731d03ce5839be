//! Live Broker Port (Driven Port)
//!
//! Interface for placing and managing orders at the real brokerage.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::shared::{ClientOrderId, PositionId, RouteId, Symbol, lenient_decimal};
use crate::domain::trading::{EntryType, ModifyCommand, OpenCommand, PositionSide};

/// Request to place one order (one leg).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    /// Client order ID.
    pub client_order_id: ClientOrderId,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Direction of the position the order opens.
    pub side: PositionSide,
    /// Quantity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty: Option<Decimal>,
    /// Entry order type.
    pub entry_type: EntryType,
    /// Entry price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Stop-loss.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl_price: Option<Decimal>,
    /// Take-profit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp_price: Option<Decimal>,
    /// Route the command came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_id: Option<RouteId>,
}

impl PlaceOrderRequest {
    /// Build the request for one leg of an open command.
    #[must_use]
    pub fn leg(command: &OpenCommand, side: PositionSide, client_order_id: ClientOrderId) -> Self {
        Self {
            client_order_id,
            symbol: command.symbol.clone(),
            side,
            qty: command.qty,
            entry_type: command.entry_type,
            price: command.price,
            sl_price: command.sl_price,
            tp_price: command.tp_price,
            route_id: command.route_id.clone(),
        }
    }
}

/// Request to change a position's protective levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyPositionRequest {
    /// New stop-loss.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sl_price: Option<Decimal>,
    /// New take-profit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tp_price: Option<Decimal>,
}

impl From<&ModifyCommand> for ModifyPositionRequest {
    fn from(command: &ModifyCommand) -> Self {
        Self {
            sl_price: command.sl_price,
            tp_price: command.tp_price,
        }
    }
}

/// Acknowledgment from the broker after placing an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    /// Broker-assigned order ID.
    pub order_id: String,
    /// Client order ID echoed back.
    #[serde(default)]
    pub client_order_id: Option<ClientOrderId>,
    /// Position opened by the fill, if the broker reports one.
    #[serde(default)]
    pub position_id: Option<PositionId>,
    /// Broker status text.
    #[serde(default)]
    pub status: Option<String>,
    /// Fill price.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub fill_price: Option<Decimal>,
}

impl OrderAck {
    /// Position to close when unwinding this order: the reported position,
    /// else the order id.
    #[must_use]
    pub fn unwind_target(&self) -> PositionId {
        self.position_id
            .clone()
            .unwrap_or_else(|| PositionId::new(self.order_id.clone()))
    }
}

/// Acknowledgment from the broker for a close or modify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionAck {
    /// Affected position.
    pub position_id: PositionId,
    /// Broker status text.
    #[serde(default)]
    pub status: Option<String>,
    /// Realized P&L from a close.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub realized_pnl: Option<Decimal>,
}

/// Broker port error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerError {
    /// Connection error.
    #[error("Broker connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Order rejected by broker.
    #[error("Order rejected: {reason}")]
    OrderRejected {
        /// Rejection reason.
        reason: String,
    },

    /// Position not found.
    #[error("Position not found: {position_id}")]
    PositionNotFound {
        /// The missing position ID.
        position_id: String,
    },

    /// Rate limited.
    #[error("Rate limited by broker")]
    RateLimited,

    /// Response could not be decoded.
    #[error("Invalid broker response: {message}")]
    InvalidResponse {
        /// Error details.
        message: String,
    },

    /// Unknown error.
    #[error("Broker error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

/// Port for the live brokerage.
#[async_trait]
pub trait LiveBrokerPort: Send + Sync {
    /// Place one order.
    async fn place_order(&self, request: PlaceOrderRequest) -> Result<OrderAck, BrokerError>;

    /// Close a position, fully when `qty` is `None`.
    async fn close_position(
        &self,
        position_id: &PositionId,
        qty: Option<Decimal>,
    ) -> Result<PositionAck, BrokerError>;

    /// Move a position's stop-loss and/or take-profit.
    async fn modify_position(
        &self,
        position_id: &PositionId,
        request: ModifyPositionRequest,
    ) -> Result<PositionAck, BrokerError>;
}
