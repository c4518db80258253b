//! # ResearchHub Core
//!
//! Session library for the ResearchHub paper-recommendation client.
//! Provides the search controller and its epoch-fenced search lifecycle,
//! recent-search history, saved papers, per-result view flags, the
//! versioned persistence bridge, the recommendation client, and
//! configuration.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod paper;
pub mod persistence;
pub mod query;
pub mod saved;
pub mod view_state;

// Re-export commonly used types at the crate root.
pub use client::{
    HttpRecommendationClient, MockRecommendationClient, RecommendRequest, RecommendResponse,
    RecommendationClient,
};
pub use config::{HubConfig, ServiceConfig, load_config};
pub use controller::{SearchController, SearchOutcome, SearchTicket, Tab};
pub use error::{ConfigError, FetchError, SearchError, StorageError};
pub use history::{MAX_RECENT_SEARCHES, RecentSearchHistory};
pub use paper::{Paper, PaperYear};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, PersistenceBridge};
pub use query::QueryState;
pub use saved::{SaveToggle, SavedCollection};
pub use view_state::ResultViewState;
