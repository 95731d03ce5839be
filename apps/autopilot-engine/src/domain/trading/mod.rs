//! Trading Bounded Context
//!
//! The shapes that cross the guard: trade commands proposed by agents or the
//! UI, and the broker account snapshot they are judged against.
//!
//! # Key Concepts
//!
//! - **Trade Command**: a tagged union over open / close / modify
//! - **Broker Snapshot**: point-in-time equity, balance, daily P&L and open positions
//! - **Execution Mode / Environment**: confirm vs auto, sim vs live

pub mod errors;
pub mod value_objects;

pub use errors::CommandParseError;
pub use value_objects::{
    BrokerSnapshot, CloseCommand, CommandKind, EntryType, ExecutionMode, ModifyCommand,
    OpenCommand, OrderSide, Position, PositionSide, TradeCommand, TradingEnvironment,
};
