use crate::model::profile::CommunityProfiles;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// License value recorded when a repository declares none
pub const LICENSE_UNAVAILABLE: &str = "Unavailable";

/// Number of weekly buckets in the commit pulse
pub const PULSE_WEEKS: usize = 52;

/// One entry of the language breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Language display name
    pub name: String,

    /// Share of code, without the trailing `%`
    pub percent: String,
}

/// Weekly commit activity, oldest week first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitGraph {
    /// Commits per week
    pub total: Vec<u64>,

    /// Week start timestamps, parallel to `total`
    pub week: Vec<i64>,
}

impl CommitGraph {
    /// Total commits over the whole graph
    pub fn commits(&self) -> u64 {
        self.total.iter().sum()
    }
}

/// Metrics extracted for one repository
///
/// Serialized field names follow the historic report format consumed by
/// the ranking front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// The identifier as submitted
    pub name: String,

    /// Resolved repository page address
    #[serde(rename = "url")]
    pub address: String,

    #[serde(rename = "commits")]
    pub commit_count: u64,

    pub alive_branch_count: u64,

    /// License name, or `"Unavailable"`
    pub license: String,

    pub languages: Vec<Language>,

    pub alive_branches: BTreeSet<String>,

    pub community_profiles: CommunityProfiles,

    pub issue_open: u64,
    pub issue_closed: u64,
    pub pr_open: u64,
    pub pr_closed: u64,

    /// Closed pull requests with an approving review, estimated from the
    /// last page of the search results
    pub estimated_approved_pull_requests: u64,

    /// Author display name to number of commits
    pub contributors: BTreeMap<String, u64>,

    pub contributors_count: usize,

    /// True when the commit history walk stopped at a safety bound
    #[serde(default)]
    pub contributors_truncated: bool,

    pub commit_graph: CommitGraph,

    /// Composite score, set by the scorer
    #[serde(rename = "opeg", default, skip_serializing_if = "Option::is_none")]
    pub opeg_score: Option<u64>,
}

impl MetricsRecord {
    /// Creates an empty record for a repository
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            commit_count: 0,
            alive_branch_count: 0,
            license: LICENSE_UNAVAILABLE.to_string(),
            languages: Vec::new(),
            alive_branches: BTreeSet::new(),
            community_profiles: CommunityProfiles::default(),
            issue_open: 0,
            issue_closed: 0,
            pr_open: 0,
            pr_closed: 0,
            estimated_approved_pull_requests: 0,
            contributors: BTreeMap::new(),
            contributors_count: 0,
            contributors_truncated: false,
            commit_graph: CommitGraph::default(),
            opeg_score: None,
        }
    }

    /// Whether the scorer has run on this record
    pub fn is_scored(&self) -> bool {
        self.opeg_score.is_some()
    }
}
