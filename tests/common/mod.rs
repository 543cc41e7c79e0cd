//! Common test utilities and helpers for mwviews tests
//!
//! This module provides a scripted in-memory transport and builders for the
//! JSON bodies the pageviews API returns, so client tests run without
//! network access.

use async_trait::async_trait;
use chrono::NaiveDate;
use mwviews::{ClientConfig, PageviewsClient};
use mwviews_client::FetchOutcome;
use mwviews_client::Transport;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fixed "today" used by every client built here
#[allow(dead_code)]
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 10).unwrap()
}

/// One scripted reply
#[derive(Clone)]
struct Reply {
    delay: Duration,
    outcome: FetchOutcome,
}

/// Transport answering from a script keyed by URL suffix
///
/// URLs that match no entry fail as if the connection was refused.
#[derive(Default)]
pub struct MockTransport {
    replies: Vec<(String, Reply)>,
    requested: Mutex<Vec<String>>,
    completed: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer URLs containing `pattern` with a 200 and `body`
    pub fn ok(self, pattern: &str, body: Value) -> Self {
        self.reply(pattern, 200, Some(body), 0)
    }

    /// Like [`MockTransport::ok`], completing after `delay_ms`
    #[allow(dead_code)]
    pub fn ok_after(self, pattern: &str, body: Value, delay_ms: u64) -> Self {
        self.reply(pattern, 200, Some(body), delay_ms)
    }

    /// Answer URLs containing `pattern` with `status` and an optional body
    pub fn status(self, pattern: &str, status: u16, body: Option<Value>) -> Self {
        self.reply(pattern, status, body, 0)
    }

    /// Fail URLs containing `pattern` without a response
    #[allow(dead_code)]
    pub fn fail(mut self, pattern: &str, reason: &str) -> Self {
        self.replies.push((
            pattern.to_string(),
            Reply {
                delay: Duration::ZERO,
                outcome: FetchOutcome::Failed {
                    reason: reason.to_string(),
                },
            },
        ));
        self
    }

    fn reply(mut self, pattern: &str, status: u16, body: Option<Value>, delay_ms: u64) -> Self {
        self.replies.push((
            pattern.to_string(),
            Reply {
                delay: Duration::from_millis(delay_ms),
                outcome: FetchOutcome::Response { status, body },
            },
        ));
        self
    }

    /// URLs in the order requests were issued
    #[allow(dead_code)]
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    /// URLs in the order responses completed
    #[allow(dead_code)]
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> FetchOutcome {
        self.requested.lock().unwrap().push(url.to_string());

        let reply = self
            .replies
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, reply)| reply.clone());

        let outcome = match reply {
            Some(reply) => {
                tokio::time::sleep(reply.delay).await;
                reply.outcome
            }
            None => FetchOutcome::Failed {
                reason: "connection refused".to_string(),
            },
        };

        self.completed.lock().unwrap().push(url.to_string());
        outcome
    }
}

/// Client on top of `transport` with "today" pinned
pub fn client_with(transport: Arc<MockTransport>) -> PageviewsClient {
    PageviewsClient::with_transport(ClientConfig::default(), transport)
        .unwrap()
        .with_today(test_today())
}

/// Per-article body: `(timestamp, views)` pairs for one article
pub fn article_body(article: &str, points: &[(&str, u64)]) -> Value {
    let items: Vec<Value> = points
        .iter()
        .map(|(timestamp, views)| {
            json!({
                "project": "en.wikipedia",
                "article": article,
                "granularity": "daily",
                "timestamp": timestamp,
                "access": "all-access",
                "agent": "all-agents",
                "views": views,
            })
        })
        .collect();
    json!({ "items": items })
}

/// Aggregate body: `(timestamp, views)` pairs for one project
#[allow(dead_code)]
pub fn project_body(project: &str, points: &[(&str, u64)]) -> Value {
    let items: Vec<Value> = points
        .iter()
        .map(|(timestamp, views)| {
            json!({
                "project": project,
                "access": "all-access",
                "agent": "all-agents",
                "granularity": "daily",
                "timestamp": timestamp,
                "views": views,
            })
        })
        .collect();
    json!({ "items": items })
}

/// Top body: one ranking with `(rank, article, views)` entries
#[allow(dead_code)]
pub fn top_body(entries: &[(u32, &str, u64)]) -> Value {
    let articles: Vec<Value> = entries
        .iter()
        .map(|(rank, article, views)| json!({ "rank": rank, "article": article, "views": views }))
        .collect();
    json!({
        "items": [{
            "project": "en.wikipedia",
            "access": "all-access",
            "year": "2023",
            "month": "01",
            "day": "09",
            "articles": articles,
        }]
    })
}

/// Error body the API sends for unknown titles
#[allow(dead_code)]
pub fn not_found_body() -> Value {
    json!({
        "type": "https://mediawiki.org/wiki/HyperSwitch/errors/not_found",
        "title": "Not found.",
        "detail": "The date(s) you used are valid, but we either do not have data for those date(s), or the project you asked for is not loaded yet.",
    })
}
