//! Journal Value Objects

mod journal_entry;

pub use journal_entry::{JournalEntry, TradeOutcome};
