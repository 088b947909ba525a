//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - AJAX / PJAX request headers expected by paginated endpoints
//! - Error classification (network, timeout, status, body)
//!
//! Every request made through `HttpFetcher` first waits for its turn on the
//! shared `RequestPacer`.

use crate::config::{Config, UserAgentConfig};
use crate::crawler::error::ExtractError;
use crate::crawler::pacer::RequestPacer;
use crate::state::ExtractionStage;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Container id the source site expects on PJAX requests
const PJAX_CONTAINER: &str = "#js-repo-pjax-container";

/// Errors raised while fetching a page
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Invalid request header {name}: {message}")]
    InvalidHeader { name: String, message: String },
}

impl FetchError {
    /// Returns true for an HTTP 404 response
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
    }
}

/// Extra headers sent with a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    entries: Vec<(&'static str, String)>,
}

impl RequestHeaders {
    /// No extra headers
    pub fn none() -> Self {
        Self::default()
    }

    /// Headers of an in-page AJAX request originating from `referer`
    pub fn ajax(referer: &Url) -> Self {
        Self {
            entries: vec![
                ("X-Requested-With", "XMLHttpRequest".to_string()),
                ("Referer", referer.to_string()),
            ],
        }
    }

    /// Headers of a PJAX navigation originating from `referer`
    pub fn pjax(referer: &Url) -> Self {
        let mut headers = Self::ajax(referer);
        headers.entries.push(("X-PJAX", "true".to_string()));
        headers
            .entries
            .push(("X-PJAX-Container", PJAX_CONTAINER.to_string()));
        headers
    }

    /// Looks up a header value by (case-insensitive) name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns true when no extra headers are set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the headers into a reqwest header map
    pub fn to_header_map(&self) -> Result<HeaderMap, FetchError> {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            let header_value =
                HeaderValue::from_str(value).map_err(|e| FetchError::InvalidHeader {
                    name: name.to_string(),
                    message: e.to_string(),
                })?;
            map.insert(header_name(name)?, header_value);
        }
        Ok(map)
    }
}

fn header_name(name: &str) -> Result<HeaderName, FetchError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| FetchError::InvalidHeader {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Source of page bodies
///
/// The extractor only ever talks to this trait, so tests can serve canned
/// pages without a network.
pub trait PageFetcher {
    /// Fetches the body of `url`, sending `headers` in addition to the defaults
    fn fetch(
        &self,
        url: &Url,
        headers: &RequestHeaders,
    ) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use opeg_crawler::config::UserAgentConfig;
/// use opeg_crawler::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "OpegCrawler".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, 30, true).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout_secs: u64,
    https_only: bool,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10)) // renamed repositories redirect
        .https_only(https_only)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent: CrawlerName/Version (+ContactURL; ContactEmail)
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// `PageFetcher` backed by reqwest
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    pacer: Arc<RequestPacer>,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client, pacer: Arc<RequestPacer>) -> Self {
        Self { client, pacer }
    }

    /// Builds the client and pacer described by the configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            &config.user_agent,
            config.crawler.request_timeout_secs,
            config.source.https_only,
        )?;
        let pacer = RequestPacer::new(Duration::from_millis(
            config.crawler.min_request_interval_ms,
        ));
        Ok(Self::new(client, Arc::new(pacer)))
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, headers: &RequestHeaders) -> Result<String, FetchError> {
        let header_map = headers.to_header_map()?;

        self.pacer.wait_turn().await;

        let response = self
            .client
            .get(url.clone())
            .headers(header_map)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Maps a reqwest error onto a fetch error kind
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Fetches one page on behalf of an extraction stage
///
/// Checks the cancellation token first, so long traversals stop between
/// pages.
pub(crate) async fn fetch_for_stage<F: PageFetcher>(
    fetcher: &F,
    url: &Url,
    headers: &RequestHeaders,
    stage: ExtractionStage,
    cancel: &CancellationToken,
) -> Result<String, ExtractError> {
    if cancel.is_cancelled() {
        return Err(ExtractError::Cancelled);
    }

    tracing::debug!("[{}] GET {}", stage, url);
    fetcher
        .fetch(url, headers)
        .await
        .map_err(|source| ExtractError::Fetch { stage, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        assert!(build_http_client(&config, 30, true).is_ok());
        assert!(build_http_client(&config, 5, false).is_ok());
    }

    #[test]
    fn test_user_agent_format() {
        let ua = user_agent_string(&create_test_config());
        assert_eq!(
            ua,
            "TestCrawler/1.0 (+https://example.com/about; admin@example.com)"
        );
    }

    #[test]
    fn test_ajax_headers() {
        let referer = Url::parse("https://github.com/o/p/graphs/commit-activity").unwrap();
        let headers = RequestHeaders::ajax(&referer);
        assert_eq!(headers.get("x-requested-with"), Some("XMLHttpRequest"));
        assert_eq!(headers.get("Referer"), Some(referer.as_str()));
        assert_eq!(headers.get("X-PJAX"), None);
    }

    #[test]
    fn test_pjax_headers_extend_ajax() {
        let referer = Url::parse("https://github.com/o/p/pulls?page=1").unwrap();
        let headers = RequestHeaders::pjax(&referer);
        assert_eq!(headers.get("X-Requested-With"), Some("XMLHttpRequest"));
        assert_eq!(headers.get("X-PJAX"), Some("true"));
        assert_eq!(headers.get("X-PJAX-Container"), Some(PJAX_CONTAINER));
    }

    #[test]
    fn test_header_map_conversion() {
        let referer = Url::parse("https://github.com/o/p").unwrap();
        let map = RequestHeaders::pjax(&referer).to_header_map().unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map.get("x-pjax").unwrap(), "true");
        assert!(RequestHeaders::none().to_header_map().unwrap().is_empty());
    }

    #[test]
    fn test_is_not_found() {
        let not_found = FetchError::Status {
            url: "https://github.com/o/p/tree/main/.github".to_string(),
            status: 404,
        };
        assert!(not_found.is_not_found());

        let server_error = FetchError::Status {
            url: "https://github.com/o/p".to_string(),
            status: 500,
        };
        assert!(!server_error.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_for_stage_respects_cancellation() {
        struct Unreachable;
        impl PageFetcher for Unreachable {
            async fn fetch(&self, url: &Url, _: &RequestHeaders) -> Result<String, FetchError> {
                panic!("fetch of {} after cancellation", url);
            }
        }

        let cancel = CancellationToken::new();
        cancel.cancel();
        let url = Url::parse("https://github.com/o/p").unwrap();
        let result = fetch_for_stage(
            &Unreachable,
            &url,
            &RequestHeaders::none(),
            ExtractionStage::Fundamentals,
            &cancel,
        )
        .await;
        assert!(matches!(result, Err(ExtractError::Cancelled)));
    }
}
