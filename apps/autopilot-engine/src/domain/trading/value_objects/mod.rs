//! Trading value objects.

mod broker_snapshot;
mod environment;
mod side;
mod trade_command;

pub use broker_snapshot::{BrokerSnapshot, Position};
pub use environment::{ExecutionMode, TradingEnvironment};
pub use side::{EntryType, OrderSide, PositionSide};
pub use trade_command::{CloseCommand, CommandKind, ModifyCommand, OpenCommand, TradeCommand};
