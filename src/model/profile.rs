use serde::{Deserialize, Serialize};
use std::fmt;

/// The community-health file kinds looked for in a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Readme,
    CodeOfConduct,
    License,
    Contributing,
    IssueTemplate,
    PullRequestTemplate,
}

impl ProfileKind {
    /// Kinds searched for in the repository root listing
    pub const ROOT: [ProfileKind; 4] = [
        Self::Readme,
        Self::CodeOfConduct,
        Self::License,
        Self::Contributing,
    ];

    /// Kinds searched for in the `.github` directory listing
    pub const GITHUB_DIR: [ProfileKind; 2] = [Self::IssueTemplate, Self::PullRequestTemplate];

    /// All six kinds in report order
    pub const ALL: [ProfileKind; 6] = [
        Self::Readme,
        Self::CodeOfConduct,
        Self::License,
        Self::Contributing,
        Self::IssueTemplate,
        Self::PullRequestTemplate,
    ];

    /// The name matched against file names (and used as the JSON key)
    pub fn name(&self) -> &'static str {
        match self {
            Self::Readme => "README",
            Self::CodeOfConduct => "CODE_OF_CONDUCT",
            Self::License => "LICENSE",
            Self::Contributing => "CONTRIBUTING",
            Self::IssueTemplate => "ISSUE_TEMPLATE",
            Self::PullRequestTemplate => "PULL_REQUEST_TEMPLATE",
        }
    }

    /// Case-insensitive substring match against a file name
    pub fn matches_file(&self, file_name: &str) -> bool {
        file_name.to_uppercase().contains(self.name())
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Presence flags for the six community profile kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityProfiles {
    #[serde(rename = "README")]
    pub readme: bool,

    #[serde(rename = "CODE_OF_CONDUCT")]
    pub code_of_conduct: bool,

    #[serde(rename = "LICENSE")]
    pub license: bool,

    #[serde(rename = "CONTRIBUTING")]
    pub contributing: bool,

    #[serde(rename = "ISSUE_TEMPLATE")]
    pub issue_template: bool,

    #[serde(rename = "PULL_REQUEST_TEMPLATE")]
    pub pull_request_template: bool,
}

impl CommunityProfiles {
    /// Returns whether a kind has been found
    pub fn get(&self, kind: ProfileKind) -> bool {
        match kind {
            ProfileKind::Readme => self.readme,
            ProfileKind::CodeOfConduct => self.code_of_conduct,
            ProfileKind::License => self.license,
            ProfileKind::Contributing => self.contributing,
            ProfileKind::IssueTemplate => self.issue_template,
            ProfileKind::PullRequestTemplate => self.pull_request_template,
        }
    }

    /// Sets the flag for a kind
    pub fn set(&mut self, kind: ProfileKind, present: bool) {
        let slot = match kind {
            ProfileKind::Readme => &mut self.readme,
            ProfileKind::CodeOfConduct => &mut self.code_of_conduct,
            ProfileKind::License => &mut self.license,
            ProfileKind::Contributing => &mut self.contributing,
            ProfileKind::IssueTemplate => &mut self.issue_template,
            ProfileKind::PullRequestTemplate => &mut self.pull_request_template,
        };
        *slot = present;
    }

    /// Merges another set of flags into this one (logical or)
    pub fn merge(&mut self, other: &CommunityProfiles) {
        for kind in ProfileKind::ALL {
            if other.get(kind) {
                self.set(kind, true);
            }
        }
    }

    /// Number of kinds found
    pub fn count_present(&self) -> usize {
        ProfileKind::ALL.iter().filter(|k| self.get(**k)).count()
    }
}
