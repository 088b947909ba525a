//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `ExtractionStage`: which sub-extraction of a repository is running
//! - `OutcomeStatus` / `RepositoryOutcome`: how each submitted repository ended

mod outcome;
mod stage;

// Re-export main types
pub use outcome::{OutcomeStatus, RepositoryOutcome};
pub use stage::ExtractionStage;
