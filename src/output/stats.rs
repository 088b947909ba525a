//! Statistics generation from crawl database
//!
//! This module provides functionality for extracting and displaying
//! statistics of the latest crawl run from the storage layer.

use crate::storage::Storage;
use crate::OpegError;
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlStatistics {
    pub run_id: i64,
    pub event_name: String,
    pub status: String,

    /// Count of outcomes by status string
    pub outcomes_by_status: HashMap<String, u64>,

    /// Number of scored records
    pub records: u64,

    pub top_score: Option<u64>,
    pub mean_score: Option<f64>,

    /// Total commits over all records
    pub total_commits: u64,

    /// Records whose contributor list is partial
    pub truncated_contributors: u64,
}

impl CrawlStatistics {
    /// Total submitted identifiers
    pub fn submitted(&self) -> u64 {
        self.outcomes_by_status.values().sum()
    }
}

/// Loads statistics of the latest run from storage
///
/// # Returns
///
/// * `Ok(Some(CrawlStatistics))` - Statistics of the latest run
/// * `Ok(None)` - The database holds no runs
/// * `Err(OpegError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<Option<CrawlStatistics>, OpegError> {
    let Some(run) = storage.get_latest_run()? else {
        return Ok(None);
    };

    let outcomes_by_status = storage.count_outcomes_by_status(run.id)?;
    let records = storage.load_records(run.id)?;
    let scores: Vec<u64> = records.iter().filter_map(|r| r.opeg_score).collect();

    let mean_score = if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<u64>() as f64 / scores.len() as f64)
    };

    Ok(Some(CrawlStatistics {
        run_id: run.id,
        event_name: run.event_name,
        status: run.status.to_db_string().to_string(),
        outcomes_by_status,
        records: records.len() as u64,
        top_score: scores.iter().copied().max(),
        mean_score,
        total_commits: records.iter().map(|r| r.commit_count).sum(),
        truncated_contributors: records.iter().filter(|r| r.contributors_truncated).count() as u64,
    }))
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run {} ({}): {}", stats.run_id, stats.status, stats.event_name);
    println!();

    println!("Outcomes:");
    let mut status_counts: Vec<_> = stats.outcomes_by_status.iter().collect();
    status_counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

    let submitted = stats.submitted();
    for (status, count) in status_counts {
        let percentage = if submitted > 0 {
            (*count as f64 / submitted as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    println!("Scores:");
    println!("  Ranked repositories: {}", stats.records);
    if let Some(top) = stats.top_score {
        println!("  Top score: {}", top);
    }
    if let Some(mean) = stats.mean_score {
        println!("  Mean score: {:.1}", mean);
    }
    println!("  Total commits: {}", stats.total_commits);
    if stats.truncated_contributors > 0 {
        println!(
            "  Partial contributor lists: {}",
            stats.truncated_contributors
        );
    }
}
