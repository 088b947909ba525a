//! Metric extraction for one repository
//!
//! `MetricExtractor::extract` visits the pages of a repository in a fixed
//! order and assembles a `MetricsRecord`:
//!
//! 1. Root page: counters, license, languages, branches, root listing
//! 2. `.github` listing on the default branch
//! 3. Issue list counters
//! 4. Approved pull request estimate
//! 5. Pull request list counters
//! 6. Commit history walk
//! 7. Weekly commit pulse
//!
//! Any failed step fails the whole extraction; nothing partial is returned.

use crate::config::CrawlerConfig;
use crate::crawler::document::Document;
use crate::crawler::error::ExtractError;
use crate::crawler::fetcher::{fetch_for_stage, PageFetcher, RequestHeaders};
use crate::crawler::pagination::{
    estimate_approved_pull_requests, walk_commit_history, WalkLimits,
};
use crate::crawler::parser::{
    list_file_names, match_profiles, parse_fundamentals, parse_pulse, parse_state_counts,
    StateCounts,
};
use crate::model::{MetricsRecord, ProfileKind};
use crate::repo::{RepoPages, ResolvedRepository};
use crate::state::ExtractionStage;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Extraction knobs taken from the crawler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorSettings {
    pub results_per_page: u64,
    pub walk_limits: WalkLimits,
}

impl From<&CrawlerConfig> for ExtractorSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            results_per_page: config.results_per_page,
            walk_limits: WalkLimits::new(
                config.max_commit_pages,
                Duration::from_secs(config.commit_walk_budget_secs),
            ),
        }
    }
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

/// Extracts the metrics of repositories through a `PageFetcher`
pub struct MetricExtractor<F> {
    fetcher: F,
    settings: ExtractorSettings,
    cancel: CancellationToken,
}

impl<F: PageFetcher> MetricExtractor<F> {
    pub fn new(fetcher: F, settings: ExtractorSettings, cancel: CancellationToken) -> Self {
        Self {
            fetcher,
            settings,
            cancel,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Extracts a complete record for one repository
    pub async fn extract(&self, repo: &ResolvedRepository) -> Result<MetricsRecord, ExtractError> {
        let pages = RepoPages::new(&repo.address);
        let mut record = MetricsRecord::new(repo.identifier.as_str(), repo.address.as_str());

        tracing::info!("[{}] Getting fundamentals...", repo.identifier);
        let root_url = page(ExtractionStage::Fundamentals, pages.root())?;
        let body = self
            .fetch(&root_url, &RequestHeaders::none(), ExtractionStage::Fundamentals)
            .await?;
        let default_branch = {
            let doc = Document::parse(&body);
            let fundamentals = parse_fundamentals(&doc)
                .map_err(|e| ExtractError::parse(ExtractionStage::Fundamentals, &root_url, e))?;
            let files = list_file_names(&doc).map_err(|e| {
                ExtractError::parse(ExtractionStage::CommunityProfiles, &root_url, e)
            })?;

            record.commit_count = fundamentals.commit_count;
            record.alive_branch_count = fundamentals.alive_branch_count;
            record.license = fundamentals.license;
            record.languages = fundamentals.languages;
            record.alive_branches = fundamentals.alive_branches;
            record.community_profiles = match_profiles(&files, &ProfileKind::ROOT);
            fundamentals.default_branch
        };

        tracing::info!("[{}] Getting community profiles...", repo.identifier);
        let github_files = self.github_dir_files(&pages, &default_branch).await?;
        record
            .community_profiles
            .merge(&match_profiles(&github_files, &ProfileKind::GITHUB_DIR));

        tracing::info!("[{}] Getting issues...", repo.identifier);
        let issues = self
            .state_counts(ExtractionStage::Issues, pages.issues())
            .await?;
        record.issue_open = issues.open;
        record.issue_closed = issues.closed;

        tracing::info!("[{}] Getting approved pull requests...", repo.identifier);
        record.estimated_approved_pull_requests = estimate_approved_pull_requests(
            &self.fetcher,
            &pages,
            self.settings.results_per_page,
            &self.cancel,
        )
        .await?;

        tracing::info!("[{}] Getting pull requests...", repo.identifier);
        let pulls = self
            .state_counts(ExtractionStage::PullRequests, pages.pulls())
            .await?;
        record.pr_open = pulls.open;
        record.pr_closed = pulls.closed;

        tracing::info!("[{}] Getting contributors...", repo.identifier);
        let activity_url = page(ExtractionStage::Contributors, pages.commit_activity())?;
        let ajax = RequestHeaders::ajax(&activity_url);
        let start = page(ExtractionStage::Contributors, pages.commits(&default_branch))?;
        let walk = walk_commit_history(
            &self.fetcher,
            start,
            &ajax,
            self.settings.walk_limits,
            &self.cancel,
        )
        .await?;
        record.contributors_count = walk.tally.distinct();
        record.contributors_truncated = walk.truncated;
        record.contributors = walk.tally.into_map();

        tracing::info!("[{}] Getting pulse data...", repo.identifier);
        let pulse_url = page(ExtractionStage::Pulse, pages.commit_activity_data())?;
        let body = self.fetch(&pulse_url, &ajax, ExtractionStage::Pulse).await?;
        record.commit_graph = parse_pulse(&body)
            .map_err(|e| ExtractError::parse(ExtractionStage::Pulse, &pulse_url, e))?;

        tracing::debug!(
            "[{}] {} commits, {} contributors, {} community profiles",
            repo.identifier,
            record.commit_count,
            record.contributors_count,
            record.community_profiles.count_present()
        );
        Ok(record)
    }

    async fn fetch(
        &self,
        url: &Url,
        headers: &RequestHeaders,
        stage: ExtractionStage,
    ) -> Result<String, ExtractError> {
        fetch_for_stage(&self.fetcher, url, headers, stage, &self.cancel).await
    }

    /// File names in `.github`; a repository without the directory has none
    async fn github_dir_files(
        &self,
        pages: &RepoPages,
        branch: &str,
    ) -> Result<Vec<String>, ExtractError> {
        let stage = ExtractionStage::CommunityProfiles;
        let url = page(stage, pages.github_dir(branch))?;

        let body = match self.fetch(&url, &RequestHeaders::none(), stage).await {
            Ok(body) => body,
            Err(ExtractError::Fetch { source, .. }) if source.is_not_found() => {
                tracing::debug!("No .github directory at {}", url);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let doc = Document::parse(&body);
        list_file_names(&doc).map_err(|e| ExtractError::parse(stage, &url, e))
    }

    async fn state_counts(
        &self,
        stage: ExtractionStage,
        address: Result<Url, url::ParseError>,
    ) -> Result<StateCounts, ExtractError> {
        let url = page(stage, address)?;
        let body = self.fetch(&url, &RequestHeaders::none(), stage).await?;
        let doc = Document::parse(&body);
        parse_state_counts(&doc).map_err(|e| ExtractError::parse(stage, &url, e))
    }
}

fn page(stage: ExtractionStage, address: Result<Url, url::ParseError>) -> Result<Url, ExtractError> {
    address.map_err(|e| ExtractError::address(stage, e))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::crawler::fetcher::FetchError;
    use crate::repo::resolve_one;
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub(crate) const ROOT_PAGE: &str = r#"
        <html><body>
            <span class="num text-emphasized">42</span>
            <span class="num text-emphasized">3</span>
            <a href="/o/p/blob/main/LICENSE"><svg class="octicon octicon-law"></svg> MIT </a>
            <span class="lang">Rust</span><span class="percent">100.0%</span>
            <span class="css-truncate-target" data-menu-button>main</span>
            <span class="select-menu-item-text css-truncate-target js-select-menu-filter-text">main</span>
            <div class="file-wrap"><table><tbody>
                <tr class="js-navigation-item"><td class="content"><span>README.md</span></td></tr>
                <tr class="js-navigation-item"><td class="content"><span>CONTRIBUTING.md</span></td></tr>
            </tbody></table></div>
        </body></html>
    "#;

    pub(crate) const GITHUB_DIR_PAGE: &str = r#"
        <div class="file-wrap"><table><tbody>
            <tr class="js-navigation-item"><td class="content"><span>PULL_REQUEST_TEMPLATE.md</span></td></tr>
        </tbody></table></div>
    "#;

    pub(crate) const ISSUES_PAGE: &str = r#"<div class="states">5 Open 12 Closed</div>"#;

    pub(crate) const PULLS_PAGE: &str = r#"<div class="states">1 Open 9 Closed</div>"#;

    pub(crate) const APPROVED_PAGE: &str = r#"
        <div class="js-navigation-container">
            <div class="Box-row">a</div><div class="Box-row">b</div>
        </div>
    "#;

    pub(crate) const COMMITS_PAGE: &str = r#"
        <div class="commit-author">alice</div>
        <div class="commit-author">bob</div>
        <div class="commit-author">alice</div>
    "#;

    pub(crate) fn pulse_body() -> String {
        let weeks: Vec<String> = (0..52)
            .map(|i| format!(r#"{{"total":1,"week":{}}}"#, 1_600_000_000 + i * 604_800))
            .collect();
        format!("[{}]", weeks.join(","))
    }

    /// Serves a small healthy repository at `https://github.com/o/p`
    pub(crate) struct RepoFixture {
        pages: HashMap<String, String>,
        pub(crate) requests: Mutex<Vec<String>>,
    }

    impl RepoFixture {
        pub(crate) fn new() -> Self {
            let base = "https://github.com/o/p";
            let pages = [
                (base.to_string(), ROOT_PAGE.to_string()),
                (format!("{}/tree/main/.github", base), GITHUB_DIR_PAGE.to_string()),
                (format!("{}/issues", base), ISSUES_PAGE.to_string()),
                (format!("{}/pulls", base), PULLS_PAGE.to_string()),
                (
                    format!(
                        "{}/pulls?page=1&q=is%3Apr+is%3Aclosed+review%3Aapproved",
                        base
                    ),
                    APPROVED_PAGE.to_string(),
                ),
                (format!("{}/commits/main", base), COMMITS_PAGE.to_string()),
                (format!("{}/graphs/commit-activity-data", base), pulse_body()),
            ];
            Self {
                pages: pages.into_iter().collect(),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn without(mut self, url: &str) -> Self {
            self.pages.remove(url);
            self
        }
    }

    impl PageFetcher for RepoFixture {
        async fn fetch(&self, url: &Url, _: &RequestHeaders) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn extractor(fixture: RepoFixture) -> MetricExtractor<RepoFixture> {
        MetricExtractor::new(
            fixture,
            ExtractorSettings::default(),
            CancellationToken::new(),
        )
    }

    fn repo() -> ResolvedRepository {
        resolve_one("o/p", "https://github.com/").unwrap()
    }

    #[tokio::test]
    async fn test_extract_full_record() {
        let record = extractor(RepoFixture::new()).extract(&repo()).await.unwrap();

        assert_eq!(record.name, "o/p");
        assert_eq!(record.address, "https://github.com/o/p");
        assert_eq!(record.commit_count, 42);
        assert_eq!(record.alive_branch_count, 3);
        assert_eq!(record.license, "MIT");
        assert_eq!(record.languages.len(), 1);
        assert!(record.community_profiles.readme);
        assert!(record.community_profiles.contributing);
        assert!(record.community_profiles.pull_request_template);
        assert!(!record.community_profiles.issue_template);
        assert_eq!((record.issue_open, record.issue_closed), (5, 12));
        assert_eq!((record.pr_open, record.pr_closed), (1, 9));
        assert_eq!(record.estimated_approved_pull_requests, 2);
        assert_eq!(record.contributors_count, 2);
        assert_eq!(record.contributors.get("alice"), Some(&2));
        assert!(!record.contributors_truncated);
        assert_eq!(record.commit_graph.total.len(), 52);
        assert_eq!(record.opeg_score, None);
    }

    #[tokio::test]
    async fn test_missing_github_dir_is_empty() {
        let fixture = RepoFixture::new().without("https://github.com/o/p/tree/main/.github");
        let record = extractor(fixture).extract(&repo()).await.unwrap();

        assert!(!record.community_profiles.pull_request_template);
        assert_eq!(record.community_profiles.count_present(), 2);
    }

    #[tokio::test]
    async fn test_missing_issue_page_fails_extraction() {
        let fixture = RepoFixture::new().without("https://github.com/o/p/issues");
        let err = extractor(fixture).extract(&repo()).await.unwrap_err();

        assert_eq!(err.stage(), Some(ExtractionStage::Issues));
    }

    #[tokio::test]
    async fn test_page_order() {
        let ex = extractor(RepoFixture::new());
        ex.extract(&repo()).await.unwrap();

        let requests = ex.fetcher().requests.lock().unwrap().clone();
        let paths: Vec<&str> = requests
            .iter()
            .map(|u| u.trim_start_matches("https://github.com/o/p"))
            .collect();
        assert_eq!(
            paths,
            vec![
                "",
                "/tree/main/.github",
                "/issues",
                "/pulls?page=1&q=is%3Apr+is%3Aclosed+review%3Aapproved",
                "/pulls",
                "/commits/main",
                "/graphs/commit-activity-data",
            ]
        );
    }

    #[tokio::test]
    async fn test_cancelled_extraction() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ex = MetricExtractor::new(RepoFixture::new(), ExtractorSettings::default(), cancel);

        let err = ex.extract(&repo()).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(ex.fetcher().requests.lock().unwrap().is_empty());
    }
}
