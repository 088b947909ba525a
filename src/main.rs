//! OPEG crawler main entry point
//!
//! This is the command-line interface for ranking the repositories of a
//! hackathon by their OPEG activity score.

use anyhow::Context;
use clap::Parser;
use opeg_crawler::config::{load_config_with_hash, Config};
use opeg_crawler::crawler::crawl;
use opeg_crawler::output::{
    generate_markdown_summary, store_report, to_pretty_json, write_json_report, OutputHandler,
    SqliteOutputHandler,
};
use opeg_crawler::repo::partition;
use opeg_crawler::storage::{SqliteStorage, Storage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// OPEG crawler: repository activity rankings for hackathons
///
/// Crawls the public pages of every participating repository, extracts
/// activity metrics and scores them. The scored records are printed as JSON
/// and persisted together with a markdown leaderboard.
#[derive(Parser, Debug)]
#[command(name = "opeg-crawler")]
#[command(version = "1.0.0")]
#[command(about = "Repository activity rankings for hackathons", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Repository to crawl as owner/project, replacing the configured list (repeatable)
    #[arg(long = "repo", value_name = "ID")]
    repos: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics of the latest run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Regenerate the markdown leaderboard of the latest run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let repositories = if cli.repos.is_empty() {
        config.event.repositories.clone()
    } else {
        cli.repos.clone()
    };

    if cli.dry_run {
        handle_dry_run(&config, &repositories);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else {
        handle_crawl(&config, &config_hash, &repositories).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the JSON report.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("opeg_crawler=info,warn"),
            1 => EnvFilter::new("opeg_crawler=debug,info"),
            2 => EnvFilter::new("opeg_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, repositories: &[String]) {
    println!("=== OPEG Crawler Dry Run ===\n");

    println!("Event: {}", config.event.name);

    println!("\nCrawler Configuration:");
    println!("  Pacing delay: {}ms", config.crawler.pacing_delay_ms);
    println!(
        "  Min request interval: {}ms",
        config.crawler.min_request_interval_ms
    );
    println!("  Max commit pages: {}", config.crawler.max_commit_pages);
    println!(
        "  Commit walk budget: {}s",
        config.crawler.commit_walk_budget_secs
    );
    println!("  Results per page: {}", config.crawler.results_per_page);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nSource:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  HTTPS only: {}", config.source.https_only);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);
    if let Some(json_path) = &config.output.json_path {
        println!("  JSON: {}", json_path);
    }

    let (resolved, rejected) = partition(repositories, &config.source.base_url);

    println!("\nRepositories ({}):", resolved.len());
    for repo in &resolved {
        println!("  - {} -> {}", repo.identifier, repo.address);
    }

    if !rejected.is_empty() {
        println!("\nRejected Identifiers ({}):", rejected.len());
        for (raw, reason) in &rejected {
            println!("  - '{}': {}", raw, reason);
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} repositories", resolved.len());
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use opeg_crawler::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    match load_statistics(&storage)? {
        Some(stats) => print_statistics(&stats),
        None => println!("No crawl runs found in database"),
    }

    Ok(())
}

/// Handles the --export-summary mode: regenerates the markdown leaderboard
fn handle_export_summary(config: &Config) -> anyhow::Result<()> {
    use opeg_crawler::output::generate_summary;

    println!("=== Exporting Leaderboard ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    tracing::info!("Loading crawl data from database...");
    let summary = generate_summary(&storage)?;

    tracing::info!("Generating markdown leaderboard...");
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))?;

    println!("✓ Leaderboard exported to: {}", config.output.summary_path);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    config_hash: &str,
    repositories: &[String],
) -> anyhow::Result<()> {
    tracing::info!(
        "Event '{}': {} repositories submitted",
        config.event.name,
        repositories.len()
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            on_interrupt.cancel();
        }
    });

    let mut storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let run_id = storage.create_run(&config.event.name, config_hash)?;
    let storage: Arc<Mutex<dyn Storage>> = Arc::new(Mutex::new(storage));
    let handler = SqliteOutputHandler::new(storage, run_id);

    let result = crawl(config, repositories, cancel).await;
    let report = store_report(&handler, result).context("Crawl failed")?;
    tracing::info!(
        "Run {} stored: {} records, {} outcomes",
        run_id,
        report.records.len(),
        report.outcomes.len()
    );

    println!("{}", to_pretty_json(&report.records)?);

    if let Some(json_path) = &config.output.json_path {
        write_json_report(&report.records, Path::new(json_path))?;
        tracing::info!("JSON report written to {}", json_path);
    }

    let summary = handler.generate_summary()?;
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))?;
    tracing::info!("Leaderboard written to {}", config.output.summary_path);

    if report.cancelled {
        tracing::warn!("Crawl was interrupted; results are partial");
    }

    Ok(())
}
