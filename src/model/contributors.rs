use std::collections::BTreeMap;

/// Per-author commit counts accumulated across commit history pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributorTally {
    counts: BTreeMap<String, u64>,
}

impl ContributorTally {
    /// Creates an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one commit by `author`
    ///
    /// Returns true when this is the first commit seen for the author.
    pub fn record(&mut self, author: &str) -> bool {
        match self.counts.get_mut(author) {
            Some(count) => {
                *count += 1;
                false
            }
            None => {
                self.counts.insert(author.to_string(), 1);
                true
            }
        }
    }

    /// Counts every author of one page
    pub fn record_page<I, S>(&mut self, authors: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for author in authors {
            self.record(author.as_ref());
        }
    }

    /// Number of distinct authors
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Commits attributed to `author`
    pub fn commits_by(&self, author: &str) -> u64 {
        self.counts.get(author).copied().unwrap_or(0)
    }

    /// Consumes the tally, returning the author map
    pub fn into_map(self) -> BTreeMap<String, u64> {
        self.counts
    }
}
