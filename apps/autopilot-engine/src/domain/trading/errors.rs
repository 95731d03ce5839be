//! Trade command decoding errors.

use thiserror::Error;

/// Why a raw command payload could not be turned into a [`TradeCommand`].
///
/// [`TradeCommand`]: super::TradeCommand
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    /// The payload has no `type` discriminator.
    #[error("command type is missing")]
    MissingCommandType,

    /// The `type` discriminator names no known command.
    #[error("unknown command type: {0}")]
    UnknownCommandType(String),

    /// The type is known but the payload does not have its shape.
    #[error("invalid command payload: {0}")]
    InvalidPayload(String),
}
