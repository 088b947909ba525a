//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and the data
//! structures describing a finished crawl.

use crate::model::MetricsRecord;
use crate::state::{OutcomeStatus, RepositoryOutcome};
use crate::storage::RunStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything one crawl produced
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub event: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Scored records of the successful repositories, in input order
    pub records: Vec<MetricsRecord>,

    /// One outcome per submitted identifier, in input order
    pub outcomes: Vec<RepositoryOutcome>,

    /// True when the run was cancelled before finishing
    pub cancelled: bool,
}

impl CrawlReport {
    /// Final status to record for the run
    pub fn run_status(&self) -> RunStatus {
        if self.cancelled {
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        }
    }

    pub fn duration_seconds(&self) -> u64 {
        (self.finished_at - self.started_at).num_seconds().max(0) as u64
    }
}

/// Summary of a stored crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Run metadata
    pub run_id: i64,
    pub event_name: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: String,
    pub config_hash: String,

    // Results
    pub records: Vec<MetricsRecord>,
    pub outcomes: Vec<RepositoryOutcome>,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    fn count(&self, predicate: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(OutcomeStatus::is_success)
    }

    pub fn skipped(&self) -> usize {
        self.count(OutcomeStatus::is_skipped)
    }

    pub fn rejected(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Rejected { .. }))
    }

    pub fn cancelled(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Cancelled))
    }

    /// Outcomes that did not produce a record
    pub fn failures(&self) -> impl Iterator<Item = &RepositoryOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_success())
    }
}

/// Trait for output handlers
///
/// Output handlers record the results of a crawl run and generate the
/// final summary.
pub trait OutputHandler {
    /// Records the scored record at `position` in the report
    fn record_metrics(&self, position: usize, record: &MetricsRecord) -> OutputResult<()>;

    /// Records the outcome of the identifier at `position` in the input
    fn record_outcome(&self, position: usize, outcome: &RepositoryOutcome) -> OutputResult<()>;

    /// Records every record and outcome of a report
    fn record_report(&self, report: &CrawlReport) -> OutputResult<()> {
        for (position, record) in report.records.iter().enumerate() {
            self.record_metrics(position, record)?;
        }
        for (position, outcome) in report.outcomes.iter().enumerate() {
            self.record_outcome(position, outcome)?;
        }
        Ok(())
    }

    /// Generates a summary of the crawl
    fn generate_summary(&self) -> OutputResult<CrawlSummary>;

    /// Finalizes the output, performing any cleanup or final writes
    ///
    /// # Arguments
    ///
    /// * `status` - The final status of the crawl run
    fn finalize(&self, status: RunStatus) -> OutputResult<()>;
}
