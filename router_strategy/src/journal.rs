use chrono::Utc;
use serde::Serialize;

use crate::{
    state::insert_journal_entry,
    utils::error::{RouterError, RouterResult},
};

/// Category of a journal entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LogType {
    Info,
    HarvestResult,
    Allocation,
    Migration,
}

/// Journal entry
#[derive(Clone, Debug, Serialize)]
pub struct JournalEntry {
    pub timestamp: u64,
    pub log_type: LogType,
    /// Error carried by the entry, if the logged operation failed
    pub error: Option<RouterError>,
    pub strategy_key: Option<u32>,
    pub note: Option<String>,
}

/// Builder for journal entries
impl JournalEntry {
    /// Create a new instance of a journal entry
    /// Fills the `timestamp`, `log_type` and `error` fields
    pub fn new(entry: RouterResult<()>, log_type: LogType) -> Self {
        Self {
            timestamp: Utc::now().timestamp() as u64,
            log_type,
            error: entry.err(),
            strategy_key: None,
            note: None,
        }
    }

    /// Fills the `strategy_key` field of the entry
    pub fn strategy(mut self, key: u32) -> Self {
        self.strategy_key = Some(key);
        self
    }

    /// Fills the `note` field of the entry
    pub fn note<S: AsRef<str>>(mut self, text: S) -> Self {
        self.note = Some(text.as_ref().to_string());
        self
    }

    /// Commits the entry to the journal
    pub fn commit(self) {
        insert_journal_entry(&self);
    }
}
