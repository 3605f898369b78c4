use std::{cell::RefCell, collections::HashMap};

use crate::{journal::JournalEntry, strategy::stable::StableStrategy, types::StrategyEvent};

thread_local! {
    /// All strategy instances, keyed by their registry key. One shared
    /// logic module, many independently-owned state records.
    pub static STRATEGY_STATE: RefCell<HashMap<u32, StableStrategy>> =
        RefCell::new(HashMap::new());
    /// Operational journal, append-only
    pub static JOURNAL: RefCell<Vec<JournalEntry>> = RefCell::new(Vec::new());
    /// Emitted strategy records, append-only
    pub static EVENTS: RefCell<Vec<StrategyEvent>> = RefCell::new(Vec::new());
}

/// Commits a journal entry to the log.
pub fn insert_journal_entry(entry: &JournalEntry) {
    JOURNAL.with(|journal| journal.borrow_mut().push(entry.clone()));
}

/// Records an emitted strategy event.
pub fn record_event(event: StrategyEvent) {
    EVENTS.with(|events| events.borrow_mut().push(event));
}

/// Allocates the next free registry key. Deployer-chosen keys and
/// factory-allocated keys share the space, so take one past the highest
/// occupied slot.
pub fn next_key() -> u32 {
    STRATEGY_STATE.with(|strategies| {
        strategies
            .borrow()
            .keys()
            .max()
            .map_or(0, |key| key + 1)
    })
}
