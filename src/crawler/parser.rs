//! Page parsers for repository metrics
//!
//! Every function here is pure: it takes an already fetched `Document` (or
//! JSON body) and returns a partial result. Fetching and sequencing live in
//! the extractor.

use crate::crawler::document::{Document, SelectorError};
use crate::model::{
    CommitGraph, CommunityProfiles, Language, ProfileKind, LICENSE_UNAVAILABLE, PULSE_WEEKS,
};
use serde::Deserialize;
use std::collections::BTreeSet;
use thiserror::Error;

const COUNTER_SELECTOR: &str = "span.num.text-emphasized";
const LICENSE_ICON_SELECTOR: &str = ".octicon-law";
const LANGUAGE_NAME_SELECTOR: &str = ".lang";
const LANGUAGE_PERCENT_SELECTOR: &str = ".percent";
const BRANCH_SELECTOR: &str = ".select-menu-item-text.css-truncate-target.js-select-menu-filter-text";
const DEFAULT_BRANCH_SELECTOR: &str = ".css-truncate-target[data-menu-button]";
const FILE_LISTING_SELECTOR: &str = ".file-wrap > table > tbody > .js-navigation-item > .content > span";
const STATES_SELECTOR: &str = ".states";
const COMMIT_AUTHOR_SELECTOR: &str = ".commit-author";
const PAGINATION_LINK_SELECTOR: &str = ".pagination > a";
const LAST_PAGE_LINK_SELECTOR: &str = ".pagination > a:nth-last-child(2)";
const PULL_ROW_SELECTOR: &str = ".js-navigation-container > .Box-row";

/// Label of the link to the next (older) commit history page
pub const OLDER_LABEL: &str = "Older";

/// Errors raised when a page does not have the expected structure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("Missing {what}")]
    Missing { what: String },

    #[error("Expected a number, found '{token}'")]
    Number { token: String },

    #[error("Commit pulse has {found} weeks, expected at least {expected}")]
    ShortPulse { found: usize, expected: usize },

    #[error("Malformed pulse data: {message}")]
    Pulse { message: String },
}

impl ParseError {
    fn missing(what: impl Into<String>) -> Self {
        Self::Missing { what: what.into() }
    }
}

/// Values read from a repository's root page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fundamentals {
    pub commit_count: u64,
    pub alive_branch_count: u64,
    pub license: String,
    pub languages: Vec<Language>,
    pub alive_branches: BTreeSet<String>,
    pub default_branch: String,
}

/// Parses a counter token, ignoring thousands separators
pub fn parse_count(token: &str) -> Result<u64, ParseError> {
    let cleaned: String = token
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    cleaned.parse().map_err(|_| ParseError::Number {
        token: token.trim().to_string(),
    })
}

/// Reads commit and branch counts, license, languages and branches
pub fn parse_fundamentals(doc: &Document) -> Result<Fundamentals, ParseError> {
    let counters = doc.select(COUNTER_SELECTOR)?;
    if counters.len() < 2 {
        return Err(ParseError::missing(format!(
            "commit and branch counters ({} of 2 found)",
            counters.len()
        )));
    }
    let commit_count = parse_count(&counters[0].text())?;
    let alive_branch_count = parse_count(&counters[1].text())?;

    Ok(Fundamentals {
        commit_count,
        alive_branch_count,
        license: parse_license(doc)?,
        languages: parse_languages(doc)?,
        alive_branches: parse_branches(doc)?,
        default_branch: parse_default_branch(doc)?,
    })
}

/// License name next to the license icon, or `"Unavailable"`
pub fn parse_license(doc: &Document) -> Result<String, ParseError> {
    let license = doc
        .select_first(LICENSE_ICON_SELECTOR)?
        .map(|icon| {
            icon.parent()
                .map(|label| label.trimmed_text().replace(',', ""))
                .unwrap_or_default()
        })
        .unwrap_or_else(|| LICENSE_UNAVAILABLE.to_string());
    Ok(license)
}

/// Language breakdown, in page order
pub fn parse_languages(doc: &Document) -> Result<Vec<Language>, ParseError> {
    let names = doc.select(LANGUAGE_NAME_SELECTOR)?;
    let percents = doc.select(LANGUAGE_PERCENT_SELECTOR)?;

    Ok(names
        .iter()
        .zip(percents.iter())
        .map(|(name, percent)| {
            let percent = percent.trimmed_text();
            Language {
                name: name.trimmed_text(),
                percent: percent.strip_suffix('%').unwrap_or(&percent).to_string(),
            }
        })
        .collect())
}

/// Branch names listed in the branch switcher
pub fn parse_branches(doc: &Document) -> Result<BTreeSet<String>, ParseError> {
    Ok(doc
        .select(BRANCH_SELECTOR)?
        .iter()
        .map(|node| node.trimmed_text())
        .collect())
}

/// Name of the branch shown by the branch switcher button
pub fn parse_default_branch(doc: &Document) -> Result<String, ParseError> {
    let branch = doc
        .select_first(DEFAULT_BRANCH_SELECTOR)?
        .map(|node| node.trimmed_text())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ParseError::missing("default branch button"))?;
    Ok(branch)
}

/// File names of a directory listing
pub fn list_file_names(doc: &Document) -> Result<Vec<String>, ParseError> {
    Ok(doc
        .select(FILE_LISTING_SELECTOR)?
        .iter()
        .map(|node| node.text())
        .collect())
}

/// Flags each of `kinds` found in `file_names`
///
/// For every kind the first matching file wins; the remaining files are not
/// inspected for that kind.
pub fn match_profiles<S: AsRef<str>>(file_names: &[S], kinds: &[ProfileKind]) -> CommunityProfiles {
    let mut profiles = CommunityProfiles::default();
    for kind in kinds {
        if let Some(file) = file_names.iter().find(|f| kind.matches_file(f.as_ref())) {
            tracing::trace!("{} matched by '{}'", kind, file.as_ref().trim());
            profiles.set(*kind, true);
        }
    }
    profiles
}

/// Open and closed counters of an issue or pull request list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub open: u64,
    pub closed: u64,
}

/// Reads the "N Open / M Closed" block, zero when the page has none
pub fn parse_state_counts(doc: &Document) -> Result<StateCounts, ParseError> {
    let Some(block) = doc.select_first(STATES_SELECTOR)? else {
        return Ok(StateCounts::default());
    };

    let text = block
        .text()
        .replace("Open", "")
        .replace("Closed", "")
        .replace(',', "");
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(ParseError::missing(format!(
            "open/closed counters in '{}'",
            block.trimmed_text()
        )));
    }

    Ok(StateCounts {
        open: parse_count(tokens[0])?,
        closed: parse_count(tokens[1])?,
    })
}

/// One page of commit history
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitPage {
    /// Author display name of every commit on the page
    pub authors: Vec<String>,

    /// Target of the "Older" link, if present
    pub older: Option<String>,
}

/// Reads commit authors and the link to the next older page
pub fn parse_commit_page(doc: &Document) -> Result<CommitPage, ParseError> {
    let authors = doc
        .select(COMMIT_AUTHOR_SELECTOR)?
        .iter()
        .map(|node| node.trimmed_text())
        .collect();

    let older = match doc
        .select(PAGINATION_LINK_SELECTOR)?
        .into_iter()
        .find(|link| link.trimmed_text() == OLDER_LABEL)
    {
        Some(link) => Some(
            link.attribute("href")
                .ok_or_else(|| ParseError::missing("href of the Older link"))?
                .to_string(),
        ),
        None => None,
    };

    Ok(CommitPage { authors, older })
}

/// One page of the approved pull request search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullListPage {
    /// Result rows shown on the page
    pub rows: u64,

    /// Index of the last page, when the results are paginated
    pub last_page: Option<u64>,
}

/// Reads the row count and the last page index of a pull request list
///
/// The last page is the label of the second-to-last pagination link
/// (`[prev, 1, 2, ..., last, next]`).
pub fn parse_pull_list_page(doc: &Document) -> Result<PullListPage, ParseError> {
    let rows = doc.count(PULL_ROW_SELECTOR)? as u64;
    let last_page = doc
        .select_first(LAST_PAGE_LINK_SELECTOR)?
        .map(|link| parse_count(&link.text()))
        .transpose()?;

    Ok(PullListPage { rows, last_page })
}

#[derive(Debug, Deserialize)]
struct PulseWeek {
    total: u64,
    week: i64,
}

/// Reads the weekly commit activity JSON into a 52-week graph
///
/// Extra weeks beyond the first 52 are ignored; fewer is an error.
pub fn parse_pulse(body: &str) -> Result<CommitGraph, ParseError> {
    let weeks: Vec<PulseWeek> = serde_json::from_str(body).map_err(|e| ParseError::Pulse {
        message: e.to_string(),
    })?;

    if weeks.len() < PULSE_WEEKS {
        return Err(ParseError::ShortPulse {
            found: weeks.len(),
            expected: PULSE_WEEKS,
        });
    }

    let (total, week) = weeks
        .iter()
        .take(PULSE_WEEKS)
        .map(|w| (w.total, w.week))
        .unzip();

    Ok(CommitGraph { total, week })
}
