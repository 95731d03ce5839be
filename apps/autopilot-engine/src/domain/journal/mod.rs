//! Journal Bounded Context
//!
//! Closed trades as the trade journal records them. Tilt detection and the
//! desk policy both read these.

pub mod value_objects;

pub use value_objects::{JournalEntry, TradeOutcome};
