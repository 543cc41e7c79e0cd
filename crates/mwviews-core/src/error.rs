//! Error types for mwviews
//!
//! This module defines the error types used throughout the mwviews crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use mwviews_core::error::{MwviewsError, Result};
//! use mwviews_core::types::Timestamp;
//!
//! fn example_function() -> Result<Timestamp> {
//!     // Malformed input is reported as MwviewsError::MalformedDate
//!     Timestamp::parse("2024-01")
//! }
//!
//! assert!(matches!(example_function(), Err(MwviewsError::MalformedDate(_))));
//! ```

use thiserror::Error;

/// Main error type for mwviews operations
///
/// Per-request transport failures never show up here directly. They are
/// recorded on the batch and only escalate through `RateLimitExceeded` or
/// `NoUsableData` once the whole batch has been classified.
#[derive(Error, Debug)]
pub enum MwviewsError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A date argument or a server timestamp could not be parsed
    #[error("Malformed date: {0}")]
    MalformedDate(String),

    /// At least one response in the batch was HTTP 429
    #[error("Pageview API rate limit exceeded")]
    RateLimitExceeded,

    /// No response in the batch carried an `items` section
    #[error("The pageview API returned nothing useful at: {}", .urls.join(", "))]
    NoUsableData {
        /// Every URL requested in the batch, in request order
        urls: Vec<String>,
    },

    /// Granularity not supported for the requested operation
    #[error("Unsupported granularity: {0}")]
    UnsupportedGranularity(String),

    /// A response carried `items` that did not match the expected schema
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        /// The URL whose body failed to decode
        url: String,
        /// The underlying serde error
        source: serde_json::Error,
    },

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl MwviewsError {
    /// Returns `true` if the error came from the server throttling the batch.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded)
    }

    /// The request URLs attached to a `NoUsableData` error.
    pub fn urls(&self) -> Option<&[String]> {
        match self {
            Self::NoUsableData { urls } => Some(urls),
            _ => None,
        }
    }
}

/// Convenience type alias for Results in mwviews
///
/// # Example
///
/// ```
/// use mwviews_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, MwviewsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MwviewsError::RateLimitExceeded;
        assert_eq!(error.to_string(), "Pageview API rate limit exceeded");
        assert!(error.is_rate_limited());
    }

    #[test]
    fn test_no_usable_data_lists_urls() {
        let error = MwviewsError::NoUsableData {
            urls: vec!["https://a/1".to_string(), "https://a/2".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "The pageview API returned nothing useful at: https://a/1, https://a/2"
        );
        assert_eq!(error.urls().map(|u| u.len()), Some(2));
        assert!(!error.is_rate_limited());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: MwviewsError = json_error.into();
        assert!(matches!(error, MwviewsError::Json(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: MwviewsError = io_error.into();
        assert!(matches!(error, MwviewsError::Io(_)));
    }
}
