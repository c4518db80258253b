//! Bounded most-recent-first log of past search queries.

use crate::error::StorageError;
use crate::persistence::{PersistenceBridge, RECENT_SEARCHES_KEY};
use crate::query::QueryState;

/// Maximum number of queries kept in the history.
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Recent-search history.
///
/// Invariants: at most [`MAX_RECENT_SEARCHES`] entries, no two entries are
/// exactly equal (case-sensitive), most recent first.
#[derive(Debug, Clone)]
pub struct RecentSearchHistory {
    entries: Vec<String>,
    bridge: PersistenceBridge,
}

impl RecentSearchHistory {
    /// Read the persisted history. Absent or malformed data yields an empty
    /// history; this never fails.
    pub fn load(bridge: PersistenceBridge) -> Self {
        let stored: Vec<String> = bridge.load_or_default(RECENT_SEARCHES_KEY);
        let entries = normalize(stored);
        tracing::debug!(count = entries.len(), "Loaded recent searches");
        Self { entries, bridge }
    }

    /// Record a successful search.
    ///
    /// The query moves to the front, any earlier identical entry is dropped,
    /// and the log is cut to the bound. The in-memory history is always
    /// updated; the returned error only reports a failed store write.
    pub fn record(&mut self, query: &str) -> Result<(), StorageError> {
        let mut updated = Vec::with_capacity(MAX_RECENT_SEARCHES);
        updated.push(query.to_string());
        updated.extend(self.entries.iter().filter(|e| *e != query).cloned());
        updated.truncate(MAX_RECENT_SEARCHES);
        self.entries = updated;

        self.bridge
            .save(RECENT_SEARCHES_KEY, &self.entries)
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to persist recent searches"))
    }

    /// Copy `query` into the query input. History is not modified.
    pub fn apply(&self, query: &str, state: &mut QueryState) {
        state.set_query(query);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.entries.get(position).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Re-establish the invariants on data read from storage.
fn normalize(stored: Vec<String>) -> Vec<String> {
    let mut entries: Vec<String> = Vec::with_capacity(MAX_RECENT_SEARCHES);
    for query in stored {
        if !entries.contains(&query) {
            entries.push(query);
        }
        if entries.len() == MAX_RECENT_SEARCHES {
            break;
        }
    }
    entries
}
