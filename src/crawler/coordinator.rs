//! Crawl coordinator - main crawl orchestration logic
//!
//! This module runs one crawl over a list of submitted identifiers:
//! - Resolving identifiers and rejecting malformed ones
//! - Extracting each repository in submission order, one at a time
//! - Retrying a failed extraction once, then skipping the repository
//! - Pausing between repositories and honoring cancellation
//! - Scoring the collected records

use crate::config::Config;
use crate::crawler::error::ExtractError;
use crate::crawler::extractor::{ExtractorSettings, MetricExtractor};
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::pacer::pause;
use crate::model::MetricsRecord;
use crate::output::CrawlReport;
use crate::repo::{resolve_one, ResolvedRepository};
use crate::scoring::score;
use crate::state::{OutcomeStatus, RepositoryOutcome};
use chrono::Utc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Extraction attempts per repository before it is skipped
pub const MAX_ATTEMPTS: u32 = 2;

/// Main crawler coordinator structure
pub struct Coordinator<F> {
    extractor: MetricExtractor<F>,
    base_url: String,
    pacing_delay: Duration,
    cancel: CancellationToken,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator fetching over HTTP as configured
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Result<Self, reqwest::Error> {
        let fetcher = HttpFetcher::from_config(config)?;
        Ok(Self::new(
            fetcher,
            ExtractorSettings::from(&config.crawler),
            config.source.base_url.clone(),
            Duration::from_millis(config.crawler.pacing_delay_ms),
            cancel,
        ))
    }
}

impl<F: PageFetcher> Coordinator<F> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Source of page bodies
    /// * `settings` - Extraction limits
    /// * `base_url` - Prefix identifiers are resolved against
    /// * `pacing_delay` - Pause after each crawled repository
    /// * `cancel` - Token stopping the run between pages
    pub fn new(
        fetcher: F,
        settings: ExtractorSettings,
        base_url: impl Into<String>,
        pacing_delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            extractor: MetricExtractor::new(fetcher, settings, cancel.clone()),
            base_url: base_url.into(),
            pacing_delay,
            cancel,
        }
    }

    pub fn fetcher(&self) -> &F {
        self.extractor.fetcher()
    }

    /// Runs the crawl over `identifiers`
    ///
    /// Every identifier gets exactly one outcome, in input order. Records of
    /// the successful repositories are scored and returned in the same order.
    pub async fn run(&self, event: &str, identifiers: &[String]) -> CrawlReport {
        let started_at = Utc::now();
        tracing::info!(
            "Starting crawl of {} repositories for '{}'",
            identifiers.len(),
            event
        );

        let mut records = Vec::new();
        let mut outcomes = Vec::with_capacity(identifiers.len());

        for raw in identifiers {
            let repo = match resolve_one(raw, &self.base_url) {
                Ok(repo) => repo,
                Err(e) => {
                    tracing::warn!("Rejecting '{}': {}", raw, e);
                    outcomes.push(RepositoryOutcome::new(
                        raw.clone(),
                        None,
                        OutcomeStatus::Rejected {
                            reason: e.to_string(),
                        },
                    ));
                    continue;
                }
            };
            let address = Some(repo.address.to_string());

            if self.cancel.is_cancelled() {
                outcomes.push(RepositoryOutcome::new(
                    raw.clone(),
                    address,
                    OutcomeStatus::Cancelled,
                ));
                continue;
            }

            let (record, status) = self.crawl_one(&repo).await;
            if let Some(record) = record {
                records.push(record);
            }
            outcomes.push(RepositoryOutcome::new(raw.clone(), address, status));

            if !pause(self.pacing_delay, &self.cancel).await {
                tracing::info!("Crawl cancelled, remaining repositories are not crawled");
            }
        }

        let succeeded = outcomes.iter().filter(|o| o.status.is_success()).count();
        let skipped = outcomes.iter().filter(|o| o.status.is_skipped()).count();
        tracing::info!(
            "Crawl finished: {} succeeded, {} skipped, {} other",
            succeeded,
            skipped,
            outcomes.len() - succeeded - skipped
        );

        CrawlReport {
            event: event.to_string(),
            started_at,
            finished_at: Utc::now(),
            records: score(records),
            outcomes,
            cancelled: self.cancel.is_cancelled(),
        }
    }

    /// Extracts one repository with the retry policy applied
    ///
    /// A failed attempt is retried once from scratch. Cancellation is never
    /// retried.
    pub async fn crawl_one(&self, repo: &ResolvedRepository) -> (Option<MetricsRecord>, OutcomeStatus) {
        tracing::info!("Crawling {} ({})", repo.identifier, repo.address);

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.extractor.extract(repo).await {
                Ok(record) => {
                    tracing::info!("[{}] Extracted after {} attempt(s)", repo.identifier, attempts);
                    return (Some(record), OutcomeStatus::Succeeded { attempts });
                }
                Err(ExtractError::Cancelled) => {
                    tracing::info!("[{}] Cancelled", repo.identifier);
                    return (None, OutcomeStatus::Cancelled);
                }
                Err(e) if attempts < MAX_ATTEMPTS => {
                    tracing::warn!(
                        "[{}] Attempt {} failed ({}): {}; retrying",
                        repo.identifier,
                        attempts,
                        e.kind(),
                        e
                    );
                }
                Err(e) => {
                    tracing::error!(
                        "[{}] Attempt {} failed ({}): {}; skipping repository",
                        repo.identifier,
                        attempts,
                        e.kind(),
                        e
                    );
                    return (
                        None,
                        OutcomeStatus::Skipped {
                            reason: e.to_string(),
                            attempts,
                        },
                    );
                }
            }
        }
    }
}
