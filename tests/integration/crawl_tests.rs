//! Integration tests for the crawler
//!
//! These tests use wiremock to serve repository pages and run the full
//! crawl cycle end-to-end: resolve, extract, retry, score and persist.

use opeg_crawler::config::{
    Config, CrawlerConfig, EventConfig, OutputConfig, SourceConfig, UserAgentConfig,
};
use opeg_crawler::crawler::crawl;
use opeg_crawler::output::{OutputHandler, SqliteOutputHandler};
use opeg_crawler::storage::{SqliteStorage, Storage};
use opeg_crawler::{opeg_score, OutcomeStatus};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, repositories: &[&str], db_path: &str) -> Config {
    Config {
        event: EventConfig {
            name: "Test Hackathon".to_string(),
            repositories: repositories.iter().map(|r| r.to_string()).collect(),
        },
        crawler: CrawlerConfig {
            pacing_delay_ms: 0,
            request_timeout_secs: 5,
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        source: SourceConfig {
            base_url: format!("{}/", server.uri()),
            https_only: false,
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
            summary_path: "./test_leaderboard.md".to_string(),
            json_path: None,
        },
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

fn listing(files: &[&str]) -> String {
    let rows: String = files
        .iter()
        .map(|f| {
            format!(
                r#"<tr class="js-navigation-item"><td class="content"><span>{}</span></td></tr>"#,
                f
            )
        })
        .collect();
    format!(r#"<div class="file-wrap"><table><tbody>{}</tbody></table></div>"#, rows)
}

fn authors(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!(r#"<div class="commit-author">{}</div>"#, n))
        .collect()
}

fn pull_rows(count: usize) -> String {
    let rows: String = (0..count).map(|_| r#"<div class="Box-row">pr</div>"#).collect();
    format!(r#"<div class="js-navigation-container">{}</div>"#, rows)
}

fn pulse_json() -> String {
    let weeks: Vec<String> = (0..52)
        .map(|i| format!(r#"{{"days":[0,0,0,0,0,0,0],"total":{},"week":{}}}"#, i % 3, 1_546_128_000 + i * 604_800))
        .collect();
    format!("[{}]", weeks.join(","))
}

/// Mounts every page of a healthy repository under `/{repo}`
async fn mount_repository(server: &MockServer, repo: &str) {
    let root = format!("/{}", repo);

    let root_page = format!(
        r#"<span class="num text-emphasized">120</span>
           <span class="num text-emphasized">2</span>
           <a href="{root}/blob/main/LICENSE"><svg class="octicon octicon-law"></svg> MIT </a>
           <span class="lang">Rust</span><span class="percent">88.5%</span>
           <span class="lang">HTML</span><span class="percent">11.5%</span>
           <span class="css-truncate-target" data-menu-button>main</span>
           <span class="select-menu-item-text css-truncate-target js-select-menu-filter-text">main</span>
           <span class="select-menu-item-text css-truncate-target js-select-menu-filter-text">feature</span>
           {listing}"#,
        root = root,
        listing = listing(&["src", "README.md", "LICENSE"])
    );
    Mock::given(method("GET"))
        .and(path(root.clone()))
        .respond_with(html(&root_page))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/tree/main/.github", root)))
        .respond_with(html(&listing(&["ISSUE_TEMPLATE.md"])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/issues", root)))
        .respond_with(html(r#"<div class="states">3 Open 4 Closed</div>"#))
        .mount(server)
        .await;

    // Approved pull requests: three pages, only the first and last are fetched
    Mock::given(method("GET"))
        .and(path(format!("{}/pulls", root)))
        .and(query_param("page", "3"))
        .and(header("X-PJAX", "true"))
        .respond_with(html(&pull_rows(4)))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/pulls", root)))
        .and(query_param("page", "1"))
        .and(query_param("q", "is:pr is:closed review:approved"))
        .respond_with(html(&format!(
            r#"{}<div class="pagination"><span class="previous_page disabled">Previous</span>
               <em class="current">1</em><a href="?page=2">2</a><a href="?page=3">3</a>
               <a class="next_page" href="?page=2">Next</a></div>"#,
            pull_rows(25)
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/pulls", root)))
        .respond_with(html(r#"<div class="states">2 Open 5 Closed</div>"#))
        .mount(server)
        .await;

    // Commit history: the older page is registered first so it wins over the
    // first page, whose matcher also accepts it
    Mock::given(method("GET"))
        .and(path(format!("{}/commits/main", root)))
        .and(query_param("after", "abc1"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .respond_with(html(&authors(&["alice", "carol"])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/commits/main", root)))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .respond_with(html(&format!(
            r#"{}<div class="pagination"><a href="{}/commits/main?after=abc1">Older</a></div>"#,
            authors(&["alice", "bob"]),
            root
        )))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/graphs/commit-activity-data", root)))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(pulse_json())
                .insert_header("content-type", "application/json"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_single_repository() {
    let mock_server = MockServer::start().await;
    mount_repository(&mock_server, "team/app").await;

    let config = create_test_config(&mock_server, &["team/app"], "unused.db");
    let report = crawl(&config, &[], CancellationToken::new())
        .await
        .expect("Failed to build HTTP client");

    assert!(!report.cancelled);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(
        report.outcomes[0].status,
        OutcomeStatus::Succeeded { attempts: 1 }
    );

    let record = &report.records[0];
    assert_eq!(record.name, "team/app");
    assert_eq!(record.address, format!("{}/team/app", mock_server.uri()));
    assert_eq!(record.commit_count, 120);
    assert_eq!(record.alive_branch_count, 2);
    assert_eq!(record.license, "MIT");
    assert_eq!(record.languages.len(), 2);
    assert_eq!(record.languages[0].percent, "88.5");
    assert!(record.alive_branches.contains("feature"));
    assert!(record.community_profiles.readme);
    assert!(record.community_profiles.license);
    assert!(record.community_profiles.issue_template);
    assert!(!record.community_profiles.pull_request_template);
    assert_eq!((record.issue_open, record.issue_closed), (3, 4));
    assert_eq!((record.pr_open, record.pr_closed), (2, 5));
    assert_eq!(record.estimated_approved_pull_requests, 2 * 25 + 4);
    assert_eq!(record.contributors_count, 3);
    assert_eq!(record.contributors.get("alice"), Some(&2));
    assert!(!record.contributors_truncated);
    assert_eq!(record.commit_graph.total.len(), 52);

    // 1200 + 7 + 1 + 7 + 3 + 2 + 3 * 3
    assert_eq!(record.opeg_score, Some(1229));
    assert_eq!(opeg_score(record), 1229);
}

#[tokio::test]
async fn test_missing_github_directory_still_succeeds() {
    let mock_server = MockServer::start().await;

    // Registered before the healthy pages so the 404 wins
    Mock::given(method("GET"))
        .and(path("/team/app/tree/main/.github"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    mount_repository(&mock_server, "team/app").await;

    let config = create_test_config(&mock_server, &["team/app"], "unused.db");
    let report = crawl(&config, &[], CancellationToken::new()).await.unwrap();

    assert_eq!(report.records.len(), 1);
    let profiles = &report.records[0].community_profiles;
    assert!(!profiles.issue_template);
    assert!(!profiles.pull_request_template);
    assert_eq!(profiles.count_present(), 2);
}

#[tokio::test]
async fn test_failing_repository_is_skipped_after_two_attempts() {
    let mock_server = MockServer::start().await;
    mount_repository(&mock_server, "team/app").await;

    Mock::given(method("GET"))
        .and(path("/team/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, &["team/broken", "team/app"], "unused.db");
    let report = crawl(&config, &[], CancellationToken::new()).await.unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].name, "team/app");

    let skipped = &report.outcomes[0];
    assert_eq!(skipped.identifier, "team/broken");
    assert!(skipped.status.is_skipped());
    assert_eq!(skipped.status.attempts(), 2);
    assert!(skipped.status.reason().unwrap_or_default().contains("500"));
    assert!(report.outcomes[1].status.is_success());
}

#[tokio::test]
async fn test_repo_override_and_rejected_identifiers() {
    let mock_server = MockServer::start().await;
    mount_repository(&mock_server, "team/app").await;

    let config = create_test_config(&mock_server, &["never/crawled"], "unused.db");
    let overrides = vec!["team/app".to_string(), "team/app/extra".to_string()];
    let report = crawl(&config, &overrides, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert!(report.outcomes[0].status.is_success());
    assert!(matches!(
        report.outcomes[1].status,
        OutcomeStatus::Rejected { .. }
    ));
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.identifier != "never/crawled"));
}

#[tokio::test]
async fn test_crawl_results_persist() {
    let mock_server = MockServer::start().await;
    mount_repository(&mock_server, "team/app").await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("opeg.db");
    let config = create_test_config(
        &mock_server,
        &["team/app", "bad"],
        db_path.to_str().unwrap(),
    );

    let mut storage = SqliteStorage::new(&db_path).expect("Failed to open database");
    let run_id = storage.create_run(&config.event.name, "hash").unwrap();
    let storage: Arc<Mutex<dyn Storage>> = Arc::new(Mutex::new(storage));
    let handler = SqliteOutputHandler::new(storage, run_id);

    let report = crawl(&config, &[], CancellationToken::new()).await.unwrap();
    handler.record_report(&report).unwrap();
    handler.finalize(report.run_status()).unwrap();

    let summary = handler.generate_summary().unwrap();
    assert_eq!(summary.status, "completed");
    assert_eq!(summary.records, report.records);
    assert_eq!(summary.outcomes, report.outcomes);
    assert_eq!(summary.succeeded(), 1);
    assert_eq!(summary.rejected(), 1);
}

#[tokio::test]
async fn test_cancelled_crawl_fetches_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let config = create_test_config(&mock_server, &["team/app", "team/other"], "unused.db");
    let report = crawl(&config, &[], cancel).await.unwrap();

    assert!(report.cancelled);
    assert!(report.records.is_empty());
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.status == OutcomeStatus::Cancelled));
}
