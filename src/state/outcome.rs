//! Per-repository crawl outcomes
//!
//! Every submitted identifier ends up with exactly one outcome, so callers can
//! tell a repository with no activity apart from one that was dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the crawl of one repository ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Metrics were extracted and are part of the result set
    Succeeded { attempts: u32 },

    /// Every attempt failed; the repository is absent from the result set
    Skipped { reason: String, attempts: u32 },

    /// The identifier was malformed and never crawled
    Rejected { reason: String },

    /// The run was cancelled before this repository finished
    Cancelled,
}

impl OutcomeStatus {
    /// Returns true if a record was produced
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Returns true if the repository was crawled but dropped
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Failure reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Skipped { reason, .. } | Self::Rejected { reason } => Some(reason),
            Self::Succeeded { .. } | Self::Cancelled => None,
        }
    }

    /// Extraction attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts } | Self::Skipped { attempts, .. } => *attempts,
            Self::Rejected { .. } | Self::Cancelled => 0,
        }
    }

    /// Converts the status to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "succeeded",
            Self::Skipped { .. } => "skipped",
            Self::Rejected { .. } => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Rebuilds a status from its database columns
    ///
    /// Returns None if the status string is unknown.
    pub fn from_db_parts(status: &str, reason: Option<String>, attempts: u32) -> Option<Self> {
        match status {
            "succeeded" => Some(Self::Succeeded { attempts }),
            "skipped" => Some(Self::Skipped {
                reason: reason.unwrap_or_default(),
                attempts,
            }),
            "rejected" => Some(Self::Rejected {
                reason: reason.unwrap_or_default(),
            }),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{}: {}", self.to_db_string(), reason),
            None => f.write_str(self.to_db_string()),
        }
    }
}

/// The outcome of one submitted identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOutcome {
    /// The identifier as submitted
    pub identifier: String,

    /// Resolved address, absent for rejected identifiers
    pub address: Option<String>,

    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl RepositoryOutcome {
    pub fn new(identifier: impl Into<String>, address: Option<String>, status: OutcomeStatus) -> Self {
        Self {
            identifier: identifier.into(),
            address,
            status,
        }
    }
}
