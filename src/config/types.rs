use crate::repo::DEFAULT_BASE_URL;
use serde::Deserialize;

/// Main configuration structure for the OPEG crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub event: EventConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub source: SourceConfig,
    pub output: OutputConfig,
}

/// The ranked event and its participating repositories
#[derive(Debug, Clone, Deserialize)]
pub struct EventConfig {
    /// Event name, used in report titles
    pub name: String,

    /// `"owner/project"` identifiers, in submission order
    #[serde(default)]
    pub repositories: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Delay after each repository (milliseconds)
    #[serde(rename = "pacing-delay-ms", default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    /// Minimum time between any two requests (milliseconds)
    #[serde(rename = "min-request-interval-ms", default)]
    pub min_request_interval_ms: u64,

    /// Maximum number of commit history pages walked per repository
    #[serde(rename = "max-commit-pages", default = "default_max_commit_pages")]
    pub max_commit_pages: u32,

    /// Time budget for one commit history walk (seconds)
    #[serde(
        rename = "commit-walk-budget-secs",
        default = "default_commit_walk_budget_secs"
    )]
    pub commit_walk_budget_secs: u64,

    /// Listing page size of the pull request search
    #[serde(rename = "results-per-page", default = "default_results_per_page")]
    pub results_per_page: u64,

    /// Per-request timeout (seconds)
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            pacing_delay_ms: default_pacing_delay_ms(),
            min_request_interval_ms: 0,
            max_commit_pages: default_max_commit_pages(),
            commit_walk_budget_secs: default_commit_walk_budget_secs(),
            results_per_page: default_results_per_page(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_pacing_delay_ms() -> u64 {
    3000
}

fn default_max_commit_pages() -> u32 {
    1000
}

fn default_commit_walk_budget_secs() -> u64 {
    900
}

fn default_results_per_page() -> u64 {
    25
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Where repository pages are fetched from
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Prefix prepended to identifiers to form page addresses
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Refuse plain HTTP connections
    #[serde(rename = "https-only", default = "default_https_only")]
    pub https_only: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            https_only: default_https_only(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_https_only() -> bool {
    true
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown leaderboard file
    #[serde(rename = "summary-path")]
    pub summary_path: String,

    /// Optional path for the JSON report
    #[serde(rename = "json-path", default)]
    pub json_path: Option<String>,
}
