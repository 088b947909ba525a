use crate::IdentifierError;
use std::fmt;
use std::str::FromStr;

/// Separator between owner and project in an identifier
pub const SEPARATOR: char = '/';

/// An `"owner/project"` repository identifier
///
/// The raw string is kept as given so that records carry exactly the name
/// the event organisers submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryIdentifier {
    raw: String,
    split: usize,
}

impl RepositoryIdentifier {
    /// Parses an identifier, requiring exactly one separator
    ///
    /// # Examples
    ///
    /// ```
    /// use opeg_crawler::repo::RepositoryIdentifier;
    ///
    /// let id = RepositoryIdentifier::parse("rust-lang/cargo").unwrap();
    /// assert_eq!(id.owner(), "rust-lang");
    /// assert_eq!(id.project(), "cargo");
    /// assert!(RepositoryIdentifier::parse("a/b/c").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let count = raw.matches(SEPARATOR).count();
        if count != 1 {
            return Err(IdentifierError::SeparatorCount {
                identifier: raw.to_string(),
                count,
            });
        }

        // count == 1, so the separator is present
        let split = raw.find(SEPARATOR).unwrap_or_default();

        Ok(Self {
            raw: raw.to_string(),
            split,
        })
    }

    /// The owning user or organisation
    pub fn owner(&self) -> &str {
        &self.raw[..self.split]
    }

    /// The project name
    pub fn project(&self) -> &str {
        &self.raw[self.split + 1..]
    }

    /// The identifier exactly as supplied
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for RepositoryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for RepositoryIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
