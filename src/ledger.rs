use serde::{Deserialize, Serialize};

use crate::structs::HistoryEntry;

/// How many past days are remembered
pub const HISTORY_CAPACITY: usize = 7;

/// Past daily results, newest first, never longer than [`HISTORY_CAPACITY`]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct HistoryLedger(Vec<HistoryEntry>);

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from persisted entries, enforcing the cap.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        let mut ledger = Self(Vec::with_capacity(HISTORY_CAPACITY));
        for entry in entries.into_iter().rev() {
            ledger.archive(entry);
        }
        ledger
    }

    /// Puts `entry` in front. Anything past the cap is dropped for good.
    pub fn archive(&mut self, entry: HistoryEntry) {
        self.0.retain(|existing| existing.date != entry.date);
        self.0.insert(0, entry);
        self.0.truncate(HISTORY_CAPACITY);
    }

    pub fn read(&self) -> &[HistoryEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
