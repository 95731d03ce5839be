//! Journal Port (Driven Port)
//!
//! Interface for the trade journal (closed trade history).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::journal::JournalEntry;

/// Journal port error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JournalError {
    /// Storage failure.
    #[error("journal storage error: {message}")]
    Storage {
        /// Error details.
        message: String,
    },

    /// Entry rejected.
    #[error("invalid journal entry: {message}")]
    InvalidEntry {
        /// Error details.
        message: String,
    },
}

/// Port for trade history.
#[async_trait]
pub trait JournalPort: Send + Sync {
    /// Record a closed trade.
    async fn record(&self, entry: JournalEntry) -> Result<JournalEntry, JournalError>;

    /// Trades closed on `date` (UTC), oldest first.
    async fn entries_for_day(&self, date: NaiveDate) -> Result<Vec<JournalEntry>, JournalError>;

    /// Trades closed at or after `since`, oldest first.
    async fn entries_since(&self, since: DateTime<Utc>) -> Result<Vec<JournalEntry>, JournalError>;
}
