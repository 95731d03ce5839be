//! In-memory trade journal.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;

use crate::application::ports::{JournalError, JournalPort};
use crate::domain::journal::JournalEntry;

/// In-memory implementation of `JournalPort`.
///
/// Entries are kept sorted by close time so queries return oldest first.
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    entries: RwLock<Vec<JournalEntry>>,
}

impl InMemoryJournal {
    /// Create a new empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the journal is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl JournalPort for InMemoryJournal {
    async fn record(&self, entry: JournalEntry) -> Result<JournalEntry, JournalError> {
        if entry.result_r.is_none() && entry.outcome.is_none() {
            return Err(JournalError::InvalidEntry {
                message: "entry needs a resultR or an outcome".to_string(),
            });
        }

        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(JournalError::InvalidEntry {
                message: format!("duplicate entry id {}", entry.id),
            });
        }
        let at = entries.partition_point(|e| e.created_at <= entry.created_at);
        entries.insert(at, entry.clone());
        Ok(entry)
    }

    async fn entries_for_day(&self, date: NaiveDate) -> Result<Vec<JournalEntry>, JournalError> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| e.trade_date() == date)
            .cloned()
            .collect())
    }

    async fn entries_since(&self, since: DateTime<Utc>) -> Result<Vec<JournalEntry>, JournalError> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| e.created_at >= since)
            .cloned()
            .collect())
    }
}
