use std::fmt;

/// The sub-extraction a repository crawl is in
///
/// Carried by extraction errors so that logs say which page broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionStage {
    /// Commit/branch counts, license, languages, branches
    Fundamentals,

    /// Community-health files in the root and `.github` listings
    CommunityProfiles,

    /// Open/closed issue counters
    Issues,

    /// Open/closed pull request counters
    PullRequests,

    /// Closed pull requests with an approving review
    ApprovedPullRequests,

    /// Commit history walk
    Contributors,

    /// Weekly commit activity
    Pulse,
}

impl ExtractionStage {
    /// Stable lowercase name used in logs and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fundamentals => "fundamentals",
            Self::CommunityProfiles => "community_profiles",
            Self::Issues => "issues",
            Self::PullRequests => "pull_requests",
            Self::ApprovedPullRequests => "approved_pull_requests",
            Self::Contributors => "contributors",
            Self::Pulse => "pulse",
        }
    }
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
