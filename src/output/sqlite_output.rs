//! SQLite-based output handler implementation
//!
//! This module provides an output handler that records crawl results
//! directly to the SQLite storage backend.

use crate::model::MetricsRecord;
use crate::output::summarize_run;
use crate::output::traits::{CrawlSummary, OutputError, OutputHandler, OutputResult};
use crate::state::RepositoryOutcome;
use crate::storage::{RunStatus, Storage};
use std::sync::{Arc, Mutex, MutexGuard};

/// SQLite-based output handler
///
/// This handler records results directly to the storage backend and
/// generates summaries from the database contents.
pub struct SqliteOutputHandler {
    storage: Arc<Mutex<dyn Storage>>,
    run_id: i64,
}

impl SqliteOutputHandler {
    /// Creates a new SQLite output handler
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `run_id` - The current run ID
    pub fn new(storage: Arc<Mutex<dyn Storage>>, run_id: i64) -> Self {
        Self { storage, run_id }
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    fn lock(&self) -> OutputResult<MutexGuard<'_, dyn Storage + 'static>> {
        self.storage
            .lock()
            .map_err(|e| OutputError::Storage(format!("Failed to lock storage: {}", e)))
    }
}

fn storage_error(e: impl std::fmt::Display) -> OutputError {
    OutputError::Storage(e.to_string())
}

impl OutputHandler for SqliteOutputHandler {
    fn record_metrics(&self, position: usize, record: &MetricsRecord) -> OutputResult<()> {
        self.lock()?
            .save_record(self.run_id, position, record)
            .map_err(storage_error)
    }

    fn record_outcome(&self, position: usize, outcome: &RepositoryOutcome) -> OutputResult<()> {
        self.lock()?
            .save_outcome(self.run_id, position, outcome)
            .map_err(storage_error)
    }

    fn generate_summary(&self) -> OutputResult<CrawlSummary> {
        let storage = self.lock()?;
        let run = storage.get_run(self.run_id).map_err(storage_error)?;
        summarize_run(&*storage, run).map_err(storage_error)
    }

    fn finalize(&self, status: RunStatus) -> OutputResult<()> {
        let mut storage = self.lock()?;

        if status == RunStatus::Completed {
            storage.complete_run(self.run_id).map_err(storage_error)?;
        } else {
            storage
                .update_run_status(self.run_id, status)
                .map_err(storage_error)?;
        }

        Ok(())
    }
}
