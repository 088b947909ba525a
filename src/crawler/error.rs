use crate::crawler::fetcher::FetchError;
use crate::crawler::parser::ParseError;
use crate::state::ExtractionStage;
use thiserror::Error;

/// Errors raised while extracting the metrics of one repository
///
/// Any of these aborts the current attempt. The coordinator decides whether
/// to retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("[{stage}] {source}")]
    Fetch {
        stage: ExtractionStage,
        source: FetchError,
    },

    #[error("[{stage}] Unexpected page structure at {url}: {source}")]
    Parse {
        stage: ExtractionStage,
        url: String,
        source: ParseError,
    },

    #[error("[{stage}] Could not build page address: {message}")]
    Address {
        stage: ExtractionStage,
        message: String,
    },

    #[error("Extraction cancelled")]
    Cancelled,
}

impl ExtractError {
    pub(crate) fn parse(stage: ExtractionStage, url: &url::Url, source: ParseError) -> Self {
        Self::Parse {
            stage,
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn address(stage: ExtractionStage, error: url::ParseError) -> Self {
        Self::Address {
            stage,
            message: error.to_string(),
        }
    }

    /// The stage the error occurred in, if any
    pub fn stage(&self) -> Option<ExtractionStage> {
        match self {
            Self::Fetch { stage, .. } | Self::Parse { stage, .. } | Self::Address { stage, .. } => {
                Some(*stage)
            }
            Self::Cancelled => None,
        }
    }

    /// Returns true if the run was cancelled rather than the page failing
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Short error category for logs and storage
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Parse { .. } => "parse",
            Self::Address { .. } => "address",
            Self::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_and_kind() {
        let err = ExtractError::Fetch {
            stage: ExtractionStage::Issues,
            source: FetchError::Timeout {
                url: "https://github.com/o/p/issues".to_string(),
            },
        };
        assert_eq!(err.stage(), Some(ExtractionStage::Issues));
        assert_eq!(err.kind(), "fetch");
        assert!(!err.is_cancelled());
        assert!(err.to_string().starts_with("[issues]"));

        assert_eq!(ExtractError::Cancelled.stage(), None);
        assert!(ExtractError::Cancelled.is_cancelled());
    }

    #[test]
    fn test_parse_error_mentions_url() {
        let url = url::Url::parse("https://github.com/o/p").unwrap();
        let err = ExtractError::parse(
            ExtractionStage::Fundamentals,
            &url,
            ParseError::Missing {
                what: "default branch button".to_string(),
            },
        );
        let message = err.to_string();
        assert!(message.contains("https://github.com/o/p"));
        assert!(message.contains("default branch button"));
    }
}
