//! Data model for extracted repository metrics
//!
//! # Components
//!
//! - `MetricsRecord`: everything extracted for one repository, plus its score
//! - `CommunityProfiles` / `ProfileKind`: community-health file presence
//! - `ContributorTally`: per-author commit counts built across history pages
//! - `CommitGraph`: the 52-week commit pulse

mod contributors;
mod profile;
mod record;

// Re-export main types
pub use contributors::ContributorTally;
pub use profile::{CommunityProfiles, ProfileKind};
pub use record::{CommitGraph, Language, MetricsRecord, LICENSE_UNAVAILABLE, PULSE_WEEKS};
