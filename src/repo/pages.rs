use url::Url;

/// Query selecting closed pull requests with an approving review
const APPROVED_PR_QUERY: &str = "q=is%3Apr+is%3Aclosed+review%3Aapproved";

/// Builds the addresses of every page the extractor visits for one repository
#[derive(Debug, Clone)]
pub struct RepoPages {
    root: String,
}

impl RepoPages {
    /// Creates a page builder rooted at a resolved repository address
    pub fn new(address: &Url) -> Self {
        Self {
            root: address.as_str().trim_end_matches('/').to_string(),
        }
    }

    /// The repository root page
    pub fn root(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.root)
    }

    /// The `.github` directory listing on the given branch
    pub fn github_dir(&self, branch: &str) -> Result<Url, url::ParseError> {
        self.page(&format!("tree/{}/.github", branch))
    }

    /// The issue list
    pub fn issues(&self) -> Result<Url, url::ParseError> {
        self.page("issues")
    }

    /// The pull request list
    pub fn pulls(&self) -> Result<Url, url::ParseError> {
        self.page("pulls")
    }

    /// One page of the closed-and-approved pull request search
    pub fn approved_pulls(&self, page: u64) -> Result<Url, url::ParseError> {
        self.page(&format!("pulls?page={}&{}", page, APPROVED_PR_QUERY))
    }

    /// First page of the commit history of a branch
    pub fn commits(&self, branch: &str) -> Result<Url, url::ParseError> {
        self.page(&format!("commits/{}", branch))
    }

    /// The commit activity graph page (used as AJAX referer)
    pub fn commit_activity(&self) -> Result<Url, url::ParseError> {
        self.page("graphs/commit-activity")
    }

    /// The weekly commit activity data endpoint
    pub fn commit_activity_data(&self) -> Result<Url, url::ParseError> {
        self.page("graphs/commit-activity-data")
    }

    fn page(&self, suffix: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}/{}", self.root, suffix))
    }
}
