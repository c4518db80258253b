//! Search session controller.
//!
//! [`SearchController`] owns every piece of session state (query input,
//! current results, loading and error flags, history, saved papers, view
//! flags, active tab) and mutates it only through the named operations
//! below. It has no I/O of its own beyond the persistence bridge, so a whole
//! session can be driven headlessly.
//!
//! Searches are split into [`SearchController::begin_search`] and
//! [`SearchController::complete_search`] so a caller may keep accepting
//! input while a request is in flight. Each search is tagged with an epoch;
//! only the response for the latest epoch is applied.

use crate::client::{RecommendRequest, RecommendationClient};
use crate::error::{FetchError, SearchError, StorageError};
use crate::history::RecentSearchHistory;
use crate::paper::Paper;
use crate::persistence::PersistenceBridge;
use crate::query::QueryState;
use crate::saved::{SaveToggle, SavedCollection};
use crate::view_state::ResultViewState;

/// Which list the user is looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Search,
    Saved,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Search => "search",
            Tab::Saved => "saved",
        }
    }

    /// Parse a tab name, case-insensitive.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "search" | "results" => Some(Tab::Search),
            "saved" | "library" => Some(Tab::Saved),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Handle for an in-flight search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    epoch: u64,
    request: RecommendRequest,
}

impl SearchTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The request to send, with the query and count captured at submit time.
    pub fn request(&self) -> &RecommendRequest {
        &self.request
    }
}

/// What happened when a response was handed back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results were installed.
    Applied { count: usize },
    /// The request failed; previous results are kept and an error is set.
    Failed(FetchError),
    /// A newer search was issued; this response was discarded untouched.
    Stale,
}

/// Owner of the session state.
#[derive(Debug)]
pub struct SearchController {
    query: QueryState,
    results: Vec<Paper>,
    loading: bool,
    error: Option<String>,
    history: RecentSearchHistory,
    saved: SavedCollection,
    view: ResultViewState,
    tab: Tab,
    latest_epoch: u64,
    last_storage_error: Option<StorageError>,
}

impl SearchController {
    /// Start a session, loading history and saved papers from `bridge`.
    pub fn new(bridge: PersistenceBridge, default_result_count: i64) -> Self {
        Self {
            query: QueryState::new(default_result_count),
            results: Vec::new(),
            loading: false,
            error: None,
            history: RecentSearchHistory::load(bridge.clone()),
            saved: SavedCollection::load(bridge),
            view: ResultViewState::new(),
            tab: Tab::default(),
            latest_epoch: 0,
            last_storage_error: None,
        }
    }

    // ── Query input ───────────────────────────────────────────────

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query.set_query(query);
    }

    pub fn set_result_count(&mut self, count: i64) {
        self.query.set_result_count(count);
    }

    /// Copy the recent search at `position` into the query input.
    pub fn apply_recent(&mut self, position: usize) -> Option<String> {
        let query = self.history.get(position)?.to_string();
        self.history.apply(&query, &mut self.query);
        Some(query)
    }

    // ── Search lifecycle ──────────────────────────────────────────

    /// Validate the current input and open a new search.
    ///
    /// A blank query sets the validation message and returns
    /// [`SearchError::EmptyQuery`] without touching the loading flag or the
    /// epoch. Otherwise loading is set, the error is cleared, and the ticket
    /// for the new latest epoch is returned.
    pub fn begin_search(&mut self) -> Result<SearchTicket, SearchError> {
        if self.query.is_blank() {
            self.error = Some(SearchError::EmptyQuery.user_message().to_string());
            return Err(SearchError::EmptyQuery);
        }
        if !self.query.count_within_advisory_range() {
            tracing::warn!(
                count = self.query.result_count(),
                "Result count outside the advertised 1-20 range; sending as-is"
            );
        }

        self.latest_epoch += 1;
        self.loading = true;
        self.error = None;

        let ticket = SearchTicket {
            epoch: self.latest_epoch,
            request: RecommendRequest {
                query: self.query.query().to_string(),
                top_n: self.query.result_count(),
            },
        };
        tracing::debug!(epoch = ticket.epoch, query = %ticket.request.query, "Search started");
        Ok(ticket)
    }

    /// Hand a response back to the session.
    ///
    /// Responses for anything but the latest epoch are discarded. On success
    /// the results replace the current set, view flags are reset, and the
    /// query is recorded in the history. On failure the previous results
    /// stay and the generic error message is set.
    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<Vec<Paper>, FetchError>,
    ) -> SearchOutcome {
        if ticket.epoch != self.latest_epoch {
            tracing::debug!(
                epoch = ticket.epoch,
                latest = self.latest_epoch,
                "Discarding stale search response"
            );
            return SearchOutcome::Stale;
        }

        self.loading = false;
        match outcome {
            Ok(papers) => {
                let count = papers.len();
                self.results = papers;
                self.view.reset();
                tracing::info!(query = %ticket.request.query, count, "Search completed");
                if let Err(e) = self.history.record(&ticket.request.query) {
                    self.last_storage_error = Some(e);
                }
                SearchOutcome::Applied { count }
            }
            Err(e) => {
                tracing::warn!(query = %ticket.request.query, error = %e, "Search failed");
                self.error = Some(e.user_message().to_string());
                SearchOutcome::Failed(e)
            }
        }
    }

    /// Run a complete search against `client`.
    pub async fn execute_search(
        &mut self,
        client: &dyn RecommendationClient,
    ) -> Result<SearchOutcome, SearchError> {
        let ticket = self.begin_search()?;
        let response = client.recommend(ticket.request()).await;
        Ok(self.complete_search(ticket, response))
    }

    /// Clear the displayed error without touching results.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // ── Saved papers ──────────────────────────────────────────────

    /// Save or unsave `paper`.
    pub fn toggle_saved(&mut self, paper: &Paper) -> SaveToggle {
        let (toggle, persisted) = self.saved.toggle(paper);
        if let Err(e) = persisted {
            self.last_storage_error = Some(e);
        }
        toggle
    }

    /// Save or unsave the result at `index` in the current result set.
    pub fn toggle_saved_result(&mut self, index: usize) -> Option<SaveToggle> {
        let paper = self.results.get(index)?.clone();
        Some(self.toggle_saved(&paper))
    }

    /// Unsave the saved paper at `index` in the saved list.
    pub fn toggle_saved_entry(&mut self, index: usize) -> Option<SaveToggle> {
        let paper = self.saved.get(index)?.clone();
        Some(self.toggle_saved(&paper))
    }

    pub fn is_saved(&self, paper: &Paper) -> bool {
        self.saved.contains(paper)
    }

    // ── View state ────────────────────────────────────────────────

    /// Flip the expanded flag of the result at `index`. `None` when there is
    /// no such result.
    pub fn toggle_expanded(&mut self, index: usize) -> Option<bool> {
        if index >= self.results.len() {
            return None;
        }
        Some(self.view.toggle(index))
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.view.is_expanded(index)
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    // ── Accessors ─────────────────────────────────────────────────

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn results(&self) -> &[Paper] {
        &self.results
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &RecentSearchHistory {
        &self.history
    }

    pub fn saved(&self) -> &SavedCollection {
        &self.saved
    }

    pub fn view(&self) -> &ResultViewState {
        &self.view
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn latest_epoch(&self) -> u64 {
        self.latest_epoch
    }

    /// Take the most recent store-write failure, if any, for display.
    pub fn take_storage_error(&mut self) -> Option<StorageError> {
        self.last_storage_error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockRecommendationClient;
    use pretty_assertions::assert_eq;

    fn controller() -> SearchController {
        SearchController::new(PersistenceBridge::in_memory(), 5)
    }

    fn papers(titles: &[&str]) -> Vec<Paper> {
        titles.iter().map(|t| Paper::new(*t)).collect()
    }

    #[test]
    fn test_blank_query_short_circuits() {
        let mut ctl = controller();
        ctl.set_query("   ");
        let result = ctl.begin_search();
        assert!(matches!(result, Err(SearchError::EmptyQuery)));
        assert!(!ctl.is_loading());
        assert_eq!(ctl.latest_epoch(), 0);
        assert_eq!(ctl.error(), Some("Please enter a search query"));
        assert!(ctl.history().is_empty());
    }

    #[test]
    fn test_begin_sets_loading_and_clears_error() {
        let mut ctl = controller();
        ctl.begin_search().unwrap_err();
        ctl.set_query("graphs");
        ctl.set_result_count(7);
        let ticket = ctl.begin_search().unwrap();
        assert!(ctl.is_loading());
        assert_eq!(ctl.error(), None);
        assert_eq!(ticket.request().query, "graphs");
        assert_eq!(ticket.request().top_n, 7);
        assert_eq!(ticket.epoch(), 1);
    }

    #[test]
    fn test_success_installs_results_and_records_history() {
        let mut ctl = controller();
        ctl.set_query("graphs");
        let ticket = ctl.begin_search().unwrap();
        let outcome = ctl.complete_search(ticket, Ok(papers(&["a", "b"])));
        assert_eq!(outcome, SearchOutcome::Applied { count: 2 });
        assert!(!ctl.is_loading());
        assert_eq!(ctl.results().len(), 2);
        assert_eq!(ctl.history().entries(), ["graphs"]);
    }

    #[test]
    fn test_failure_keeps_previous_results() {
        let mut ctl = controller();
        ctl.set_query("graphs");
        let first = ctl.begin_search().unwrap();
        ctl.complete_search(first, Ok(papers(&["a", "b", "c"])));

        ctl.set_query("optics");
        let second = ctl.begin_search().unwrap();
        let outcome = ctl.complete_search(second, Err(FetchError::Status { status: 500 }));
        assert!(matches!(outcome, SearchOutcome::Failed(_)));
        assert_eq!(ctl.results().len(), 3);
        assert!(!ctl.is_loading());
        assert_eq!(
            ctl.error(),
            Some("Error fetching recommendations. Please check if the server is running.")
        );
        assert_eq!(ctl.history().entries(), ["graphs"]);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut ctl = controller();
        ctl.set_query("slow");
        let slow = ctl.begin_search().unwrap();
        ctl.set_query("fast");
        let fast = ctl.begin_search().unwrap();
        assert!(slow.epoch() < fast.epoch());
        assert_eq!(ctl.latest_epoch(), fast.epoch());

        assert_eq!(
            ctl.complete_search(fast, Ok(papers(&["fast result"]))),
            SearchOutcome::Applied { count: 1 }
        );
        assert_eq!(
            ctl.complete_search(slow, Ok(papers(&["slow 1", "slow 2"]))),
            SearchOutcome::Stale
        );
        assert_eq!(ctl.results()[0].title, "fast result");
        assert_eq!(ctl.history().entries(), ["fast"]);
    }

    #[test]
    fn test_stale_completion_keeps_loading_for_latest() {
        let mut ctl = controller();
        ctl.set_query("one");
        let one = ctl.begin_search().unwrap();
        ctl.set_query("two");
        let two = ctl.begin_search().unwrap();

        ctl.complete_search(one, Err(FetchError::Timeout { timeout_secs: 30 }));
        assert!(ctl.is_loading());
        assert_eq!(ctl.error(), None);

        ctl.complete_search(two, Ok(Vec::new()));
        assert!(!ctl.is_loading());
    }

    #[test]
    fn test_new_results_reset_expanded_flags() {
        let mut ctl = controller();
        ctl.set_query("q");
        let t = ctl.begin_search().unwrap();
        ctl.complete_search(t, Ok(papers(&["a", "b"])));
        assert_eq!(ctl.toggle_expanded(1), Some(true));

        let t = ctl.begin_search().unwrap();
        ctl.complete_search(t, Ok(papers(&["c", "d"])));
        assert!(!ctl.is_expanded(1));
        assert_eq!(ctl.toggle_expanded(5), None);
    }

    #[test]
    fn test_failed_search_keeps_expanded_flags() {
        let mut ctl = controller();
        ctl.set_query("q");
        let t = ctl.begin_search().unwrap();
        ctl.complete_search(t, Ok(papers(&["a"])));
        ctl.toggle_expanded(0);

        let t = ctl.begin_search().unwrap();
        ctl.complete_search(t, Err(FetchError::Status { status: 404 }));
        assert!(ctl.is_expanded(0));
    }

    #[test]
    fn test_toggle_saved_result() {
        let mut ctl = controller();
        ctl.set_query("q");
        let t = ctl.begin_search().unwrap();
        ctl.complete_search(t, Ok(papers(&["a", "b"])));

        assert_eq!(ctl.toggle_saved_result(1), Some(SaveToggle::Saved));
        assert!(ctl.is_saved(&Paper::new("b")));
        assert_eq!(ctl.toggle_saved_result(9), None);
        assert_eq!(ctl.toggle_saved_entry(0), Some(SaveToggle::Removed));
        assert!(ctl.saved().is_empty());
    }

    #[test]
    fn test_apply_recent() {
        let mut ctl = controller();
        for q in ["x", "y"] {
            ctl.set_query(q);
            let t = ctl.begin_search().unwrap();
            ctl.complete_search(t, Ok(Vec::new()));
        }
        ctl.set_query("");
        assert_eq!(ctl.apply_recent(1).as_deref(), Some("x"));
        assert_eq!(ctl.query().query(), "x");
        assert_eq!(ctl.history().entries(), ["y", "x"]);
        assert_eq!(ctl.apply_recent(7), None);
    }

    #[test]
    fn test_tab_selection() {
        let mut ctl = controller();
        assert_eq!(ctl.tab(), Tab::Search);
        ctl.select_tab(Tab::Saved);
        assert_eq!(ctl.tab(), Tab::Saved);
        assert_eq!(Tab::from_str_loose(" SAVED "), Some(Tab::Saved));
        assert_eq!(Tab::from_str_loose("nope"), None);
    }

    #[test]
    fn test_out_of_range_count_passes_through() {
        let mut ctl = controller();
        ctl.set_query("q");
        ctl.set_result_count(42);
        let ticket = ctl.begin_search().unwrap();
        assert_eq!(ticket.request().top_n, 42);
    }

    #[tokio::test]
    async fn test_execute_search_with_mock() {
        let client = MockRecommendationClient::with_papers(papers(&["a", "b", "c"]));
        let mut ctl = controller();
        ctl.set_query("quantum computing");
        let outcome = ctl.execute_search(&client).await.unwrap();
        assert_eq!(outcome, SearchOutcome::Applied { count: 3 });
        assert_eq!(client.requests()[0].top_n, 5);
    }

    #[tokio::test]
    async fn test_execute_search_empty_query_sends_nothing() {
        let client = MockRecommendationClient::new();
        let mut ctl = controller();
        let result = ctl.execute_search(&client).await;
        assert!(matches!(result, Err(SearchError::EmptyQuery)));
        assert!(client.requests().is_empty());
    }
}
