//! Crawler module for repository page fetching and metric extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with AJAX/PJAX headers and request pacing
//! - HTML parsing into documents and pure page parsers
//! - Multi-page traversals (commit history, paginated search)
//! - Per-repository extraction and overall crawl coordination

mod coordinator;
mod document;
mod error;
mod extractor;
mod fetcher;
mod pacer;
mod pagination;
mod parser;

pub use coordinator::{Coordinator, MAX_ATTEMPTS};
pub use document::{Document, Node, SelectorError};
pub use error::ExtractError;
pub use extractor::{ExtractorSettings, MetricExtractor};
pub use fetcher::{build_http_client, user_agent_string, FetchError, HttpFetcher, PageFetcher, RequestHeaders};
pub use pacer::{pause, RequestPacer};
pub use pagination::{
    estimate_approved_pull_requests, estimate_from_last_page, walk_commit_history, CommitWalk,
    WalkLimits,
};
pub use parser::{
    list_file_names, match_profiles, parse_commit_page, parse_count, parse_fundamentals,
    parse_pull_list_page, parse_pulse, parse_state_counts, CommitPage, Fundamentals, ParseError,
    PullListPage, StateCounts,
};

use crate::config::Config;
use crate::output::CrawlReport;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl of the configured event
///
/// `repositories` overrides the identifiers listed in the configuration when
/// non-empty.
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Scored records and one outcome per identifier
/// * `Err(reqwest::Error)` - The HTTP client could not be built
pub async fn crawl(
    config: &Config,
    repositories: &[String],
    cancel: CancellationToken,
) -> Result<CrawlReport, reqwest::Error> {
    let identifiers = if repositories.is_empty() {
        &config.event.repositories[..]
    } else {
        repositories
    };

    let coordinator = Coordinator::from_config(config, cancel)?;
    Ok(coordinator.run(&config.event.name, identifiers).await)
}
