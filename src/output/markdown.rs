//! Markdown leaderboard generation
//!
//! This module generates a human-readable leaderboard of a crawl run: the
//! ranked repositories with their score breakdown, followed by the
//! repositories that produced no record and why.

use crate::output::traits::{CrawlSummary, OutputResult};
use crate::scoring::rank;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown leaderboard from a run summary
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run summary as a markdown leaderboard
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {} Leaderboard\n\n", summary.event_name));

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Run ID**: {}\n", summary.run_id));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    md.push_str("## Repositories\n\n");
    md.push_str(&format!("- **Submitted**: {}\n", summary.outcomes.len()));
    md.push_str(&format!("- **Ranked**: {}\n", summary.succeeded()));
    md.push_str(&format!("- **Skipped**: {}\n", summary.skipped()));
    md.push_str(&format!("- **Rejected**: {}\n", summary.rejected()));
    if summary.cancelled() > 0 {
        md.push_str(&format!("- **Cancelled**: {}\n", summary.cancelled()));
    }
    md.push('\n');

    // Ranking
    md.push_str("## Ranking\n\n");
    if summary.records.is_empty() {
        md.push_str("No repository was crawled successfully.\n\n");
    } else {
        md.push_str("| Rank | Repository | OPEG | Commits | Issues | PRs | Approved PRs | Contributors | Branches | Profiles | License |\n");
        md.push_str("|------|------------|------|---------|--------|-----|--------------|--------------|----------|----------|---------|\n");

        for entry in rank(&summary.records) {
            let r = entry.record;
            let contributors = if r.contributors_truncated {
                format!("{}+", r.contributors_count)
            } else {
                r.contributors_count.to_string()
            };
            md.push_str(&format!(
                "| {} | [{}]({}) | {} | {} | {} | {} | {} | {} | {} | {}/6 | {} |\n",
                entry.rank,
                escape_link_text(&r.name),
                r.address.replace(')', "%29").replace('|', "%7C"),
                entry.score,
                r.commit_count,
                r.issue_open + r.issue_closed,
                r.pr_open + r.pr_closed,
                r.estimated_approved_pull_requests,
                contributors,
                r.alive_branch_count,
                r.community_profiles.count_present(),
                escape_cell(&r.license)
            ));
        }
        md.push('\n');
    }

    // Repositories without a record
    let failures: Vec<_> = summary.failures().collect();
    if !failures.is_empty() {
        md.push_str("## Not Ranked\n\n");
        md.push_str("| Repository | Status | Reason |\n");
        md.push_str("|------------|--------|--------|\n");

        for outcome in failures {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&outcome.identifier),
                outcome.status.to_db_string(),
                escape_cell(outcome.status.reason().unwrap_or("-"))
            ));
        }
        md.push('\n');
    }

    md
}

/// Escapes text placed in a table cell
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Escapes text placed inside `[...]` of a link in a table cell
fn escape_link_text(text: &str) -> String {
    escape_cell(text).replace('[', "\\[").replace(']', "\\]")
}
