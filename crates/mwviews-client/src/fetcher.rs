//! Concurrent fetching of pageview API batches
//!
//! A batch is the list of URLs produced for one logical query. The
//! [`Fetcher`] issues them with at most `parallelism` requests in flight and
//! hands back exactly one [`RawResult`] per URL, in URL order, whatever order
//! the responses arrive in.
//!
//! Failures never escape this module as errors: a connection error or a
//! timeout is recorded on the request's own [`RawResult`] and left for the
//! classifier to judge at the batch level.

use crate::config::ClientConfig;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use mwviews_core::error::Result;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// HTTP status the API uses when a client is throttled
pub const RATE_LIMIT_STATUS: u16 = 429;

/// What happened to a single GET
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The server answered; `body` is `None` when it was not valid JSON
    Response { status: u16, body: Option<Value> },
    /// The request never produced a response
    Failed { reason: String },
}

/// Outcome of one request in a batch, tagged with its URL
#[derive(Debug, Clone, PartialEq)]
pub struct RawResult {
    /// The URL that was requested
    pub url: String,
    /// Response or failure
    pub outcome: FetchOutcome,
}

impl RawResult {
    /// A result that records a transport failure
    pub fn failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome: FetchOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    /// HTTP status, if a response arrived
    pub fn status(&self) -> Option<u16> {
        match &self.outcome {
            FetchOutcome::Response { status, .. } => Some(*status),
            FetchOutcome::Failed { .. } => None,
        }
    }

    /// Parsed JSON body, if a response arrived and it was JSON
    pub fn body(&self) -> Option<&Value> {
        match &self.outcome {
            FetchOutcome::Response { body, .. } => body.as_ref(),
            FetchOutcome::Failed { .. } => None,
        }
    }

    /// Whether the server throttled this request
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(RATE_LIMIT_STATUS)
    }
}

/// The network seam of the fetcher
///
/// Implementations perform one GET and must turn every failure into a
/// [`FetchOutcome::Failed`] value instead of returning early.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for `url`
    async fn get(&self, url: &str) -> FetchOutcome;
}

/// [`Transport`] backed by a shared `reqwest` client
///
/// Configured headers, the user agent, and the optional timeout are baked
/// into the client, so they apply to every request it sends.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the underlying HTTP client from the configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .default_headers(config.header_map()?)
            .user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> FetchOutcome {
        let started = Instant::now();
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "Request failed");
                return FetchOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let status = response.status().as_u16();
        let body = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice::<Value>(&bytes).ok(),
            Err(e) => {
                warn!(url, status, error = %e, "Failed to read response body");
                None
            }
        };

        debug!(
            url,
            status,
            duration_ms = started.elapsed().as_millis() as u64,
            json = body.is_some(),
            "Fetched"
        );
        FetchOutcome::Response { status, body }
    }
}

/// Bounded-parallelism batch executor
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    parallelism: usize,
    show_progress: bool,
}

impl Fetcher {
    /// Create a fetcher running at most `parallelism` requests at once
    pub fn new(transport: Arc<dyn Transport>, parallelism: usize) -> Self {
        Self {
            transport,
            parallelism: parallelism.max(1),
            show_progress: false,
        }
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Maximum number of requests in flight
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Fetch every URL and return the results in URL order
    ///
    /// Each completed request writes into the slot matching its position in
    /// `urls`, so completion order has no effect on the returned order.
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<RawResult> {
        let started = Instant::now();
        let mut slots: Vec<Option<RawResult>> = std::iter::repeat_with(|| None)
            .take(urls.len())
            .collect();

        let progress = if self.show_progress && urls.len() > 1 {
            let pb = ProgressBar::new(urls.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} requests")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb.set_message("Fetching pageviews");
            Some(pb)
        } else {
            None
        };

        let transport = self.transport.as_ref();
        let mut completed = stream::iter(urls.iter().enumerate())
            .map(|(index, url)| async move { (index, transport.get(url).await) })
            .buffer_unordered(self.parallelism);

        while let Some((index, outcome)) = completed.next().await {
            slots[index] = Some(RawResult {
                url: urls[index].clone(),
                outcome,
            });
            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let results: Vec<RawResult> = slots
            .into_iter()
            .zip(urls)
            .map(|(slot, url)| slot.unwrap_or_else(|| RawResult::failed(url, "request never completed")))
            .collect();

        let failures = results
            .iter()
            .filter(|r| matches!(r.outcome, FetchOutcome::Failed { .. }))
            .count();
        info!(
            requests = results.len(),
            failures,
            parallelism = self.parallelism,
            duration_ms = started.elapsed().as_millis() as u64,
            "Batch fetched"
        );

        results
    }
}
