//! Multi-page traversals
//!
//! - `walk_commit_history`: follows "Older" links through the commit history,
//!   tallying authors, within a page and time budget
//! - `estimate_approved_pull_requests`: sizes a paginated search from its
//!   first and last pages only

use crate::crawler::document::Document;
use crate::crawler::error::ExtractError;
use crate::crawler::fetcher::{fetch_for_stage, PageFetcher, RequestHeaders};
use crate::crawler::parser::{parse_commit_page, parse_pull_list_page};
use crate::model::ContributorTally;
use crate::repo::RepoPages;
use crate::state::ExtractionStage;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Safety bounds of a commit history walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkLimits {
    pub max_pages: u32,
    pub time_budget: Duration,
}

impl WalkLimits {
    pub fn new(max_pages: u32, time_budget: Duration) -> Self {
        Self {
            max_pages,
            time_budget,
        }
    }
}

/// Result of a commit history walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitWalk {
    pub tally: ContributorTally,

    /// Pages fetched
    pub pages: u32,

    /// True when a limit stopped the walk before the last page
    pub truncated: bool,
}

/// Walks commit history pages starting at `start`
///
/// Each page's authors are tallied, then the "Older" link (resolved against
/// the page address) is followed until there is none. A page or time limit
/// stops the walk early and marks it truncated; whatever was tallied so far
/// is kept.
pub async fn walk_commit_history<F: PageFetcher>(
    fetcher: &F,
    start: Url,
    headers: &RequestHeaders,
    limits: WalkLimits,
    cancel: &CancellationToken,
) -> Result<CommitWalk, ExtractError> {
    let stage = ExtractionStage::Contributors;
    let started = Instant::now();
    let mut walk = CommitWalk::default();
    let mut next = Some(start);

    while let Some(url) = next.take() {
        if walk.pages >= limits.max_pages {
            tracing::warn!(
                "Commit walk stopped at {} pages, contributor list is partial",
                walk.pages
            );
            walk.truncated = true;
            break;
        }
        if started.elapsed() >= limits.time_budget {
            tracing::warn!(
                "Commit walk ran out of time after {} pages ({:?}), contributor list is partial",
                walk.pages,
                limits.time_budget
            );
            walk.truncated = true;
            break;
        }

        let body = fetch_for_stage(fetcher, &url, headers, stage, cancel).await?;
        let page = {
            let doc = Document::parse(&body);
            parse_commit_page(&doc).map_err(|e| ExtractError::parse(stage, &url, e))?
        };

        walk.pages += 1;
        tracing::debug!(
            "Commits: page {} has {} commits",
            walk.pages,
            page.authors.len()
        );
        walk.tally.record_page(&page.authors);

        next = page
            .older
            .map(|href| url.join(&href))
            .transpose()
            .map_err(|e| ExtractError::address(stage, e))?;
    }

    Ok(walk)
}

/// Estimated total from the index of the last page and its row count
///
/// Every page before the last is assumed to be full.
pub fn estimate_from_last_page(last_page: u64, per_page: u64, rows_on_last: u64) -> u64 {
    last_page
        .saturating_sub(1)
        .saturating_mul(per_page)
        .saturating_add(rows_on_last)
}

/// Estimates the number of closed pull requests with an approving review
///
/// Fetches the first page of the search; without pagination its row count
/// is the answer. Otherwise only the last page is fetched (as a PJAX request
/// from the first page) and the total is extrapolated from it.
pub async fn estimate_approved_pull_requests<F: PageFetcher>(
    fetcher: &F,
    pages: &RepoPages,
    per_page: u64,
    cancel: &CancellationToken,
) -> Result<u64, ExtractError> {
    let stage = ExtractionStage::ApprovedPullRequests;

    let first_url = pages
        .approved_pulls(1)
        .map_err(|e| ExtractError::address(stage, e))?;
    let body = fetch_for_stage(fetcher, &first_url, &RequestHeaders::none(), stage, cancel).await?;
    let first = {
        let doc = Document::parse(&body);
        parse_pull_list_page(&doc).map_err(|e| ExtractError::parse(stage, &first_url, e))?
    };

    let last_page = match first.last_page {
        Some(page) if page > 1 => page,
        _ => return Ok(first.rows),
    };

    let last_url = pages
        .approved_pulls(last_page)
        .map_err(|e| ExtractError::address(stage, e))?;
    let headers = RequestHeaders::pjax(&first_url);
    let body = fetch_for_stage(fetcher, &last_url, &headers, stage, cancel).await?;
    let last = {
        let doc = Document::parse(&body);
        parse_pull_list_page(&doc).map_err(|e| ExtractError::parse(stage, &last_url, e))?
    };

    tracing::debug!(
        "Approved pull requests: {} pages, {} rows on the last",
        last_page,
        last.rows
    );
    Ok(estimate_from_last_page(last_page, per_page, last.rows))
}
