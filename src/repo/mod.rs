//! Repository identifier handling
//!
//! This module turns raw `"owner/project"` strings into canonical page
//! addresses and derives the address of every page visited for a repository.

mod identifier;
mod pages;
mod resolver;

// Re-export main types and functions
pub use identifier::{RepositoryIdentifier, SEPARATOR};
pub use pages::RepoPages;
pub use resolver::{partition, resolve, resolve_one, ResolvedRepository, DEFAULT_BASE_URL};
