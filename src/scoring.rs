//! OPEG scoring and ranking
//!
//! The score is a fixed linear combination of a record's metrics:
//!
//! ```text
//! commits * 10
//!   + open and closed issues
//!   + 1 if the license field is non-empty
//!   + open and closed pull requests
//!   + distinct contributors
//!   + alive branches
//!   + 3 per community profile present
//! ```
//!
//! The license term only tests for a non-empty string, so the
//! `"Unavailable"` placeholder also earns the point.

use crate::model::MetricsRecord;
use serde::Serialize;

const COMMIT_WEIGHT: u64 = 10;
const PROFILE_WEIGHT: u64 = 3;

/// Computes the OPEG score of one record
///
/// Counters come from scraped pages, so the sum saturates at `u64::MAX`
/// instead of overflowing.
pub fn opeg_score(record: &MetricsRecord) -> u64 {
    let license = u64::from(!record.license.is_empty());
    let profiles = record.community_profiles.count_present() as u64 * PROFILE_WEIGHT;

    [
        record.issue_open,
        record.issue_closed,
        license,
        record.pr_open,
        record.pr_closed,
        record.contributors_count as u64,
        record.alive_branch_count,
        profiles,
    ]
    .into_iter()
    .fold(record.commit_count.saturating_mul(COMMIT_WEIGHT), u64::saturating_add)
}

/// Sets the score on every record, keeping their order
pub fn score(mut records: Vec<MetricsRecord>) -> Vec<MetricsRecord> {
    for record in &mut records {
        let value = opeg_score(record);
        tracing::debug!("{} scored {}", record.name, value);
        record.opeg_score = Some(value);
    }
    records
}

/// A record's position on the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry<'a> {
    /// 1-based rank; equal scores share a rank
    pub rank: usize,
    pub score: u64,
    pub record: &'a MetricsRecord,
}

/// Orders records by score, highest first
///
/// Records are scored on the fly if the scorer has not run. Ties keep input
/// order and share the rank of the first of them (1, 2, 2, 4).
pub fn rank(records: &[MetricsRecord]) -> Vec<RankedEntry<'_>> {
    let mut scored: Vec<(u64, &MetricsRecord)> = records
        .iter()
        .map(|r| (r.opeg_score.unwrap_or_else(|| opeg_score(r)), r))
        .collect();
    // Stable sort keeps submission order among ties
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut entries: Vec<RankedEntry<'_>> = Vec::with_capacity(scored.len());
    for (index, (score, record)) in scored.into_iter().enumerate() {
        let rank = match entries.last() {
            Some(prev) if prev.score == score => prev.rank,
            _ => index + 1,
        };
        entries.push(RankedEntry {
            rank,
            score,
            record,
        });
    }
    entries
}
