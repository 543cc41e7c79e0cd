//! Client configuration

use mwviews_core::error::{MwviewsError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::time::Duration;

/// Maximum number of requests in flight when nothing else is configured
pub const DEFAULT_PARALLELISM: usize = 10;

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("mwviews/", env!("CARGO_PKG_VERSION"));

/// Settings shared by every query a client issues
///
/// # Examples
/// ```
/// use mwviews_client::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::default()
///     .with_parallelism(4)
///     .with_header("From", "someone@example.org")
///     .with_timeout(Duration::from_secs(30));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.parallelism, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Maximum number of requests in flight, must be positive
    pub parallelism: usize,
    /// Extra headers attached to every request
    pub headers: BTreeMap<String, String>,
    /// `User-Agent` header value
    pub user_agent: String,
    /// Per-request timeout, unlimited when `None`
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_PARALLELISM,
            headers: BTreeMap::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check the configuration before any request is made
    pub fn validate(&self) -> Result<()> {
        if self.parallelism == 0 {
            return Err(MwviewsError::Config(
                "parallelism must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(MwviewsError::Config("timeout must be non-zero".to_string()));
        }
        HeaderValue::from_str(&self.user_agent)
            .map_err(|e| MwviewsError::Config(format!("invalid user agent: {e}")))?;
        self.header_map().map(|_| ())
    }

    /// Configured headers as a `reqwest` header map
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| MwviewsError::Config(format!("invalid header name '{name}': {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| MwviewsError::Config(format!("invalid value for header '{name}': {e}")))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}
