//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::model::MetricsRecord;
use crate::state::RepositoryOutcome;
use crate::storage::{RunRecord, RunStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Unknown outcome status '{0}' in database")]
    UnknownStatus(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed to persist and reload
/// the results of crawl runs.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `event_name` - Name of the ranked event
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, event_name: &str, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Updates the status of a run
    fn update_run_status(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Marks a run as completed with a finish timestamp
    fn complete_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Results =====

    /// Saves the record at `position` in the report
    ///
    /// A repository submitted twice yields two records at different
    /// positions; saving the same position again replaces it.
    fn save_record(
        &mut self,
        run_id: i64,
        position: usize,
        record: &MetricsRecord,
    ) -> StorageResult<()>;

    /// Saves the outcome of the identifier at `position` in the input
    fn save_outcome(
        &mut self,
        run_id: i64,
        position: usize,
        outcome: &RepositoryOutcome,
    ) -> StorageResult<()>;

    /// Loads the records of a run in report order
    fn load_records(&self, run_id: i64) -> StorageResult<Vec<MetricsRecord>>;

    /// Loads the outcomes of a run in input order
    fn load_outcomes(&self, run_id: i64) -> StorageResult<Vec<RepositoryOutcome>>;

    // ===== Statistics =====

    /// Counts the outcomes of a run by status string
    fn count_outcomes_by_status(&self, run_id: i64) -> StorageResult<HashMap<String, u64>>;
}
