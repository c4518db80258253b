//! Per-result expand/collapse flags for the current result set.

use std::collections::HashMap;

/// Expanded flags keyed by result position.
///
/// Valid only for one result set: the controller calls [`reset`] whenever
/// new results are installed, so a flag never outlives the paper it was
/// set on.
///
/// [`reset`]: ResultViewState::reset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultViewState {
    expanded: HashMap<usize, bool>,
}

impl ResultViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag at `index` and return the new value. Absent flags count
    /// as collapsed, so the first toggle expands.
    pub fn toggle(&mut self, index: usize) -> bool {
        let flag = self.expanded.entry(index).or_insert(false);
        *flag = !*flag;
        *flag
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.get(&index).copied().unwrap_or(false)
    }

    /// Forget every flag.
    pub fn reset(&mut self) {
        self.expanded.clear();
    }

    /// Number of currently expanded results.
    pub fn expanded_count(&self) -> usize {
        self.expanded.values().filter(|v| **v).count()
    }
}
