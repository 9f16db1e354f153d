//! Error types for stock analysis operations

use analyst_llm::LLMError;
use thiserror::Error;

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Provider answered with a non-success HTTP status
    #[error("{provider} returned HTTP {status}")]
    HttpStatus { provider: &'static str, status: u16 },

    /// Provider had nothing for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Malformed URL built from configuration
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Search results page could not be read
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Prompt template failed to render
    #[error("Prompt error: {0}")]
    PromptError(#[from] minijinja::Error),

    /// Language model call failed
    #[error("Language model error: {0}")]
    LlmError(#[from] LLMError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StockError {
    /// Whether a repeated attempt could succeed
    ///
    /// Transport failures, throttling and server-side errors are transient;
    /// a missing symbol or a malformed payload is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            StockError::NetworkError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            StockError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::DataUnavailable {
            symbol: "FAKE.NS".to_string(),
            reason: "no quoteSummary result".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Data not available for FAKE.NS: no quoteSummary result"
        );

        let err = StockError::HttpStatus {
            provider: "Yahoo Finance",
            status: 404,
        };
        assert_eq!(err.to_string(), "Yahoo Finance returned HTTP 404");
    }

    #[test]
    fn test_retryable_classification() {
        let server_side = StockError::HttpStatus {
            provider: "DuckDuckGo",
            status: 503,
        };
        let throttled = StockError::HttpStatus {
            provider: "DuckDuckGo",
            status: 429,
        };
        let not_found = StockError::HttpStatus {
            provider: "Yahoo Finance",
            status: 404,
        };
        let missing = StockError::DataUnavailable {
            symbol: "X".to_string(),
            reason: "none".to_string(),
        };

        assert!(server_side.is_retryable());
        assert!(throttled.is_retryable());
        assert!(!not_found.is_retryable());
        assert!(!missing.is_retryable());
        assert!(!StockError::ParseError("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_llm_error_conversion() {
        let err: StockError = LLMError::AuthenticationFailed.into();
        assert!(matches!(err, StockError::LlmError(_)));
        assert!(err.to_string().contains("authentication"));
    }
}
