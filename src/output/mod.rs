//! Output module for crawl results and reports
//!
//! This module handles:
//! - Printing and writing the scored records as indented JSON
//! - Generating the markdown leaderboard of a run
//! - Recording results and statistics to the database

mod json;
mod markdown;
mod sqlite_output;
pub mod stats;
mod traits;

pub use json::{to_pretty_json, write_json_report};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use sqlite_output::SqliteOutputHandler;
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use traits::{CrawlReport, CrawlSummary, OutputError, OutputHandler, OutputResult};

use crate::storage::{RunRecord, RunStatus, Storage, StorageResult};
use crate::OpegError;
use chrono::{DateTime, Utc};

/// Generates a summary of the latest run from storage
///
/// # Arguments
///
/// * `storage` - The storage backend containing crawl data
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Successfully generated summary
/// * `Err(OpegError)` - No run recorded, or the query failed
pub fn generate_summary(storage: &dyn Storage) -> Result<CrawlSummary, OpegError> {
    let run = storage.get_latest_run()?.ok_or_else(|| {
        OpegError::Output(OutputError::Storage(
            "No crawl runs found in database".to_string(),
        ))
    })?;

    Ok(summarize_run(storage, run)?)
}

/// Stores the result of a crawl and finalizes its run
///
/// When the crawl itself failed, or recording its report fails, the run is
/// finalized as `Failed` and the original error is returned.
pub fn store_report<E>(
    handler: &dyn OutputHandler,
    result: Result<CrawlReport, E>,
) -> Result<CrawlReport, OpegError>
where
    OpegError: From<E>,
{
    let stored = result.map_err(OpegError::from).and_then(|report| {
        handler.record_report(&report)?;
        handler.finalize(report.run_status())?;
        Ok(report)
    });

    if let Err(e) = &stored {
        tracing::error!("Crawl run failed: {}", e);
        if let Err(mark) = handler.finalize(RunStatus::Failed) {
            tracing::error!("Could not mark the run as failed: {}", mark);
        }
    }

    stored
}

/// Builds the summary of one stored run
pub(crate) fn summarize_run(storage: &dyn Storage, run: RunRecord) -> StorageResult<CrawlSummary> {
    let duration_seconds = match (
        run.started_at.parse::<DateTime<Utc>>(),
        run.finished_at.as_deref().map(str::parse::<DateTime<Utc>>),
    ) {
        (Ok(started), Some(Ok(finished))) => Some((finished - started).num_seconds().max(0) as u64),
        _ => None,
    };

    let records = storage.load_records(run.id)?;
    let outcomes = storage.load_outcomes(run.id)?;

    Ok(CrawlSummary {
        run_id: run.id,
        event_name: run.event_name,
        started_at: run.started_at,
        finished_at: run.finished_at,
        duration_seconds,
        status: run.status.to_db_string().to_string(),
        config_hash: run.config_hash,
        records,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetricsRecord;
    use crate::state::RepositoryOutcome;
    use crate::storage::SqliteStorage;
    use std::sync::{Arc, Mutex};

    fn sqlite_handler() -> SqliteOutputHandler {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("Hackathon", "hash").unwrap();
        let storage: Arc<Mutex<dyn Storage>> = Arc::new(Mutex::new(storage));
        SqliteOutputHandler::new(storage, run_id)
    }

    fn empty_report() -> CrawlReport {
        CrawlReport {
            event: "Hackathon".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            records: Vec::new(),
            outcomes: Vec::new(),
            cancelled: false,
        }
    }

    /// Handler whose writes always fail, remembering finalize calls
    #[derive(Default)]
    struct BrokenHandler {
        finalized: Mutex<Vec<RunStatus>>,
    }

    impl OutputHandler for BrokenHandler {
        fn record_metrics(&self, _: usize, _: &MetricsRecord) -> OutputResult<()> {
            Err(OutputError::Storage("disk full".to_string()))
        }

        fn record_outcome(&self, _: usize, _: &RepositoryOutcome) -> OutputResult<()> {
            Err(OutputError::Storage("disk full".to_string()))
        }

        fn generate_summary(&self) -> OutputResult<CrawlSummary> {
            Ok(CrawlSummary::new())
        }

        fn finalize(&self, status: RunStatus) -> OutputResult<()> {
            self.finalized.lock().unwrap().push(status);
            Ok(())
        }
    }

    #[test]
    fn test_store_report_completes_run() {
        let handler = sqlite_handler();

        let report = store_report(&handler, Ok::<_, OpegError>(empty_report())).unwrap();
        assert!(!report.cancelled);
        assert_eq!(handler.generate_summary().unwrap().status, "completed");
    }

    #[test]
    fn test_failed_crawl_marks_run_failed() {
        let handler = sqlite_handler();

        let result: Result<CrawlReport, OutputError> =
            Err(OutputError::Storage("client unavailable".to_string()));
        assert!(store_report(&handler, result).is_err());
        assert_eq!(handler.generate_summary().unwrap().status, "failed");
    }

    #[test]
    fn test_failed_write_marks_run_failed() {
        let handler = BrokenHandler::default();
        let mut report = empty_report();
        report.records.push(MetricsRecord::new("o/p", "https://github.com/o/p"));

        let err = store_report(&handler, Ok::<_, OpegError>(report)).unwrap_err();
        assert!(err.to_string().contains("disk full"));
        assert_eq!(*handler.finalized.lock().unwrap(), vec![RunStatus::Failed]);
    }

    #[test]
    fn test_generate_summary_without_runs() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(generate_summary(&storage).is_err());
    }

    #[test]
    fn test_generate_summary_of_completed_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("Hackathon", "abc").unwrap();
        storage.complete_run(run_id).unwrap();

        let summary = generate_summary(&storage).unwrap();
        assert_eq!(summary.run_id, run_id);
        assert_eq!(summary.status, "completed");
        assert_eq!(summary.config_hash, "abc");
        assert!(summary.duration_seconds.is_some());
    }
}
