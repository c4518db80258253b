//! Error types for the ResearchHub core library.
//!
//! Uses `thiserror` for public API error types with structured variants,
//! one enum per concern: search validation, recommendation fetches,
//! durable storage, and configuration.

/// Message shown to the user when a search is submitted without a query.
pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a search query";

/// Message shown to the user for every kind of fetch failure.
pub const FETCH_FAILED_MESSAGE: &str =
    "Error fetching recommendations. Please check if the server is running.";

/// Errors raised when submitting a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("{}", EMPTY_QUERY_MESSAGE)]
    EmptyQuery,
}

impl SearchError {
    /// The message the session surfaces for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            SearchError::EmptyQuery => EMPTY_QUERY_MESSAGE,
        }
    }
}

/// Errors from the recommendation service.
///
/// The variants exist for logs; the user always sees [`FETCH_FAILED_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to create HTTP client: {message}")]
    ClientBuild { message: String },

    #[error("Recommendation request failed: {message}")]
    Transport { message: String },

    #[error("Recommendation request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Recommendation service returned status {status}")]
    Status { status: u16 },

    #[error("Recommendation response could not be decoded: {message}")]
    Decode { message: String },
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        FETCH_FAILED_MESSAGE
    }
}

/// Errors from the durable key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O failed for '{key}': {message}")]
    Io { key: String, message: String },

    #[error("Stored value for '{key}' is malformed: {message}")]
    Malformed { key: String, message: String },

    #[error("Stored value for '{key}' has unsupported schema version {found}")]
    UnsupportedVersion { key: String, found: u32 },

    #[error("Failed to serialize '{key}': {message}")]
    Serialize { key: String, message: String },
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}
