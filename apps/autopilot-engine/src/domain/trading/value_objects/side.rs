//! Order and position sides, entry types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a proposed order.
///
/// `Both` opens a long and a short position at once (two legs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    /// Buy order.
    #[serde(rename = "BUY", alias = "buy", alias = "Buy")]
    Buy,
    /// Sell order.
    #[serde(rename = "SELL", alias = "sell", alias = "Sell")]
    Sell,
    /// Buy and sell legs together.
    #[serde(rename = "BOTH", alias = "both", alias = "Both")]
    Both,
}

impl OrderSide {
    /// Number of positions an order on this side opens.
    #[must_use]
    pub const fn leg_count(&self) -> usize {
        match self {
            Self::Both => 2,
            Self::Buy | Self::Sell => 1,
        }
    }

    /// Position side the order opens, `None` for `Both`.
    #[must_use]
    pub const fn position_side(&self) -> Option<PositionSide> {
        match self {
            Self::Buy => Some(PositionSide::Long),
            Self::Sell => Some(PositionSide::Short),
            Self::Both => None,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Both => write!(f, "BOTH"),
        }
    }
}

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionSide {
    /// Long position.
    #[serde(
        rename = "LONG",
        alias = "long",
        alias = "Long",
        alias = "BUY",
        alias = "buy"
    )]
    Long,
    /// Short position.
    #[serde(
        rename = "SHORT",
        alias = "short",
        alias = "Short",
        alias = "SELL",
        alias = "sell"
    )]
    Short,
}

impl PositionSide {
    /// Order side that opened a position of this side.
    #[must_use]
    pub const fn order_side(&self) -> OrderSide {
        match self {
            Self::Long => OrderSide::Buy,
            Self::Short => OrderSide::Sell,
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

/// How the entry is placed at the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Fill at the current market price.
    #[default]
    #[serde(alias = "MARKET")]
    Market,
    /// Resting limit order at `price`.
    #[serde(alias = "LIMIT")]
    Limit,
    /// Stop entry triggered at `price`.
    #[serde(alias = "STOP")]
    Stop,
}
