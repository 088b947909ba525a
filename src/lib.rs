//! OPEG crawler: repository activity metrics for hackathon rankings
//!
//! This crate crawls the public pages of a list of repositories, extracts
//! activity metrics (commits, branches, issues, pull requests, contributors,
//! community files, weekly commit pulse) and reduces them into a single
//! OPEG score used to rank the participants of an event.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod repo;
pub mod scoring;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for OPEG crawler operations
#[derive(Debug, Error)]
pub enum OpegError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] crawler::ExtractError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Identifier error: {0}")]
    Identifier(#[from] IdentifierError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Repository identifier errors
///
/// These never abort a crawl: the resolver filters malformed identifiers
/// out and reports them as rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("Identifier '{identifier}' must contain exactly one '/', found {count}")]
    SeparatorCount { identifier: String, count: usize },

    #[error("Identifier '{identifier}' does not form a valid address: {message}")]
    InvalidAddress { identifier: String, message: String },
}

/// Result type alias for OPEG crawler operations
pub type Result<T> = std::result::Result<T, OpegError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{CommunityProfiles, MetricsRecord, ProfileKind};
pub use repo::{resolve, RepositoryIdentifier, ResolvedRepository};
pub use scoring::{opeg_score, rank, score};
pub use state::{OutcomeStatus, RepositoryOutcome};
