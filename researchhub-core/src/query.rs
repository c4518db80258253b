//! Query input state: the current query text and requested result count.

use std::ops::RangeInclusive;

/// Result count the input widget advertises. Not enforced here.
pub const ADVISORY_RESULT_RANGE: RangeInclusive<i64> = 1..=20;

/// Default number of results requested.
pub const DEFAULT_RESULT_COUNT: i64 = 5;

/// Holds the user's current query and result count.
///
/// Pure state: setters never validate, clamp, or trigger side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    query: String,
    result_count: i64,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(DEFAULT_RESULT_COUNT)
    }
}

impl QueryState {
    pub fn new(result_count: i64) -> Self {
        Self {
            query: String::new(),
            result_count,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn result_count(&self) -> i64 {
        self.result_count
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_result_count(&mut self, count: i64) {
        self.result_count = count;
    }

    /// Whether the query is empty once surrounding whitespace is removed.
    pub fn is_blank(&self) -> bool {
        self.query.trim().is_empty()
    }

    pub fn count_within_advisory_range(&self) -> bool {
        ADVISORY_RESULT_RANGE.contains(&self.result_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = QueryState::default();
        assert_eq!(state.query(), "");
        assert_eq!(state.result_count(), 5);
        assert!(state.is_blank());
    }

    #[test]
    fn test_setters_do_not_clamp() {
        let mut state = QueryState::default();
        state.set_result_count(50);
        assert_eq!(state.result_count(), 50);
        assert!(!state.count_within_advisory_range());
        state.set_result_count(0);
        assert_eq!(state.result_count(), 0);
        state.set_result_count(20);
        assert!(state.count_within_advisory_range());
    }

    #[test]
    fn test_whitespace_query_is_blank() {
        let mut state = QueryState::default();
        state.set_query("   \t ");
        assert!(state.is_blank());
        state.set_query("  graphs ");
        assert!(!state.is_blank());
        assert_eq!(state.query(), "  graphs ");
    }
}
