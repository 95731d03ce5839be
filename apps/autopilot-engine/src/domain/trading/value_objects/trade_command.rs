//! Trade commands proposed to the execution pipeline.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EntryType, OrderSide};
use crate::domain::shared::{ClientOrderId, PositionId, RouteId, Symbol, lenient_decimal};
use crate::domain::trading::errors::CommandParseError;

/// Open a new position (or a BUY + SELL pair for `side = BOTH`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenCommand {
    /// Instrument to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Quantity (lots or units, as the broker counts them).
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub qty: Option<Decimal>,
    /// Entry price (reference price for market entries).
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    /// Protective stop-loss price.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub sl_price: Option<Decimal>,
    /// Take-profit price.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub tp_price: Option<Decimal>,
    /// Entry order type.
    #[serde(default)]
    pub entry_type: EntryType,
    /// Route the command was proposed on.
    #[serde(default)]
    pub route_id: Option<RouteId>,
    /// Caller-assigned order id.
    #[serde(default)]
    pub client_order_id: Option<ClientOrderId>,
}

impl OpenCommand {
    /// Create an open command with entry, stop and size set.
    #[must_use]
    pub fn new(
        symbol: impl Into<Symbol>,
        side: OrderSide,
        qty: Decimal,
        price: Decimal,
        sl_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            qty: Some(qty),
            price: Some(price),
            sl_price: Some(sl_price),
            tp_price: None,
            entry_type: EntryType::Market,
            route_id: None,
            client_order_id: None,
        }
    }

    /// Set the take-profit price.
    #[must_use]
    pub const fn with_take_profit(mut self, tp_price: Decimal) -> Self {
        self.tp_price = Some(tp_price);
        self
    }

    /// Set the client order id.
    #[must_use]
    pub fn with_client_order_id(mut self, id: impl Into<ClientOrderId>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }

    /// Number of positions this command would create.
    #[must_use]
    pub const fn new_positions(&self) -> usize {
        self.side.leg_count()
    }
}

/// Close (fully or partially) an open position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseCommand {
    /// Position to close.
    pub position_id: PositionId,
    /// Quantity to close; the whole position when absent.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub qty: Option<Decimal>,
}

impl CloseCommand {
    /// Close the whole position.
    #[must_use]
    pub fn new(position_id: impl Into<PositionId>) -> Self {
        Self {
            position_id: position_id.into(),
            qty: None,
        }
    }
}

/// Move the stop-loss and/or take-profit of an open position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifyCommand {
    /// Position to modify.
    pub position_id: PositionId,
    /// New stop-loss price.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub sl_price: Option<Decimal>,
    /// New take-profit price.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub tp_price: Option<Decimal>,
}

impl ModifyCommand {
    /// Move the stop-loss only.
    #[must_use]
    pub fn stop_loss(position_id: impl Into<PositionId>, sl_price: Decimal) -> Self {
        Self {
            position_id: position_id.into(),
            sl_price: Some(sl_price),
            tp_price: None,
        }
    }
}

/// A trade command, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TradeCommand {
    /// Open a position.
    Open(OpenCommand),
    /// Close a position.
    Close(CloseCommand),
    /// Modify a position's protective levels.
    Modify(ModifyCommand),
}

/// Discriminator of a [`TradeCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    /// Open command.
    Open,
    /// Close command.
    Close,
    /// Modify command.
    Modify,
}

impl CommandKind {
    /// Wire name of the command type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::Modify => "modify",
        }
    }

    fn from_wire(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "close" => Some(Self::Close),
            "modify" => Some(Self::Modify),
            _ => None,
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TradeCommand {
    /// Decode a raw JSON command.
    ///
    /// The `type` discriminator is checked first so that a missing or
    /// unknown type is reported as such rather than as a generic shape error.
    ///
    /// # Errors
    ///
    /// Returns [`CommandParseError`] when the type is missing or unknown, or
    /// the payload does not match the command's shape.
    pub fn parse(value: Value) -> Result<Self, CommandParseError> {
        let Value::Object(mut fields) = value else {
            return Err(CommandParseError::InvalidPayload(
                "command must be a JSON object".to_string(),
            ));
        };

        let kind = match fields.get("type") {
            None | Some(Value::Null) => return Err(CommandParseError::MissingCommandType),
            Some(Value::String(raw)) if raw.trim().is_empty() => {
                return Err(CommandParseError::MissingCommandType);
            }
            Some(Value::String(raw)) => CommandKind::from_wire(raw.trim())
                .ok_or_else(|| CommandParseError::UnknownCommandType(raw.clone()))?,
            Some(other) => {
                return Err(CommandParseError::UnknownCommandType(other.to_string()));
            }
        };

        fields.insert("type".to_string(), Value::String(kind.as_str().to_string()));

        let command: Self = serde_json::from_value(Value::Object(fields))
            .map_err(|e| CommandParseError::InvalidPayload(e.to_string()))?;
        command.validate_shape()?;
        Ok(command)
    }

    fn validate_shape(&self) -> Result<(), CommandParseError> {
        match self {
            Self::Open(open) => open
                .symbol
                .validate()
                .map_err(|e| CommandParseError::InvalidPayload(e.to_string())),
            Self::Close(CloseCommand { position_id, .. })
            | Self::Modify(ModifyCommand { position_id, .. }) => {
                if position_id.as_str().trim().is_empty() {
                    Err(CommandParseError::InvalidPayload(
                        "positionId cannot be empty".to_string(),
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// The command's discriminator.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::Open(_) => CommandKind::Open,
            Self::Close(_) => CommandKind::Close,
            Self::Modify(_) => CommandKind::Modify,
        }
    }
}

impl From<OpenCommand> for TradeCommand {
    fn from(command: OpenCommand) -> Self {
        Self::Open(command)
    }
}

impl From<CloseCommand> for TradeCommand {
    fn from(command: CloseCommand) -> Self {
        Self::Close(command)
    }
}

impl From<ModifyCommand> for TradeCommand {
    fn from(command: ModifyCommand) -> Self {
        Self::Modify(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn parse_open_command() {
        let command = TradeCommand::parse(json!({
            "type": "open",
            "symbol": "eurusd",
            "side": "BUY",
            "qty": 10,
            "price": "100",
            "slPrice": 99,
            "tpPrice": 103,
            "entryType": "limit",
            "routeId": "route-1",
            "clientOrderId": "cmd-1"
        }))
        .unwrap();

        let TradeCommand::Open(open) = command else {
            panic!("expected open command");
        };
        assert_eq!(open.symbol.as_str(), "EURUSD");
        assert_eq!(open.side, OrderSide::Buy);
        assert_eq!(open.qty, Some(dec!(10)));
        assert_eq!(open.price, Some(dec!(100)));
        assert_eq!(open.sl_price, Some(dec!(99)));
        assert_eq!(open.entry_type, EntryType::Limit);
        assert_eq!(open.client_order_id, Some(ClientOrderId::new("cmd-1")));
    }

    #[test]
    fn parse_type_is_case_insensitive() {
        let command = TradeCommand::parse(json!({"type": "CLOSE", "positionId": "p-1"})).unwrap();
        assert_eq!(command.kind(), CommandKind::Close);
    }

    #[test]
    fn parse_missing_type() {
        let err = TradeCommand::parse(json!({"positionId": "p-1"})).unwrap_err();
        assert_eq!(err, CommandParseError::MissingCommandType);

        let err = TradeCommand::parse(json!({"type": null})).unwrap_err();
        assert_eq!(err, CommandParseError::MissingCommandType);

        let err = TradeCommand::parse(json!({"type": "  "})).unwrap_err();
        assert_eq!(err, CommandParseError::MissingCommandType);
    }

    #[test]
    fn parse_unknown_type() {
        let err = TradeCommand::parse(json!({"type": "hedge"})).unwrap_err();
        assert_eq!(
            err,
            CommandParseError::UnknownCommandType("hedge".to_string())
        );

        let err = TradeCommand::parse(json!({"type": 7})).unwrap_err();
        assert!(matches!(err, CommandParseError::UnknownCommandType(_)));
    }

    #[test]
    fn parse_invalid_numbers_become_missing() {
        let command = TradeCommand::parse(json!({
            "type": "open",
            "symbol": "EURUSD",
            "side": "SELL",
            "qty": "lots",
            "price": null
        }))
        .unwrap();

        let TradeCommand::Open(open) = command else {
            panic!("expected open command");
        };
        assert_eq!(open.qty, None);
        assert_eq!(open.price, None);
        assert_eq!(open.sl_price, None);
    }

    #[test]
    fn parse_rejects_bad_shapes() {
        let err = TradeCommand::parse(json!({"type": "open", "side": "BUY"})).unwrap_err();
        assert!(matches!(err, CommandParseError::InvalidPayload(_)));

        let err = TradeCommand::parse(json!({"type": "open", "symbol": "", "side": "BUY"}))
            .unwrap_err();
        assert!(matches!(err, CommandParseError::InvalidPayload(_)));

        let err = TradeCommand::parse(json!({"type": "modify", "positionId": ""})).unwrap_err();
        assert!(matches!(err, CommandParseError::InvalidPayload(_)));

        let err = TradeCommand::parse(json!("open")).unwrap_err();
        assert!(matches!(err, CommandParseError::InvalidPayload(_)));
    }

    #[test]
    fn serializes_with_type_tag() {
        let command = TradeCommand::from(ModifyCommand::stop_loss("p-9", dec!(1.0850)));
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["type"], "modify");
        assert_eq!(json["positionId"], "p-9");
    }

    #[test]
    fn new_positions_counts_legs() {
        let both = OpenCommand::new("EURUSD", OrderSide::Both, dec!(1), dec!(100), dec!(95));
        assert_eq!(both.new_positions(), 2);
        let buy = OpenCommand::new("EURUSD", OrderSide::Buy, dec!(1), dec!(100), dec!(95));
        assert_eq!(buy.new_positions(), 1);
    }
}
