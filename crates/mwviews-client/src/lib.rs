//! Concurrent client for the Wikimedia pageviews REST API
//!
//! This crate plans request URLs, fetches them with bounded parallelism,
//! classifies the batch as a whole, and merges the responses into
//! date-indexed tables.
//!
//! # Example
//!
//! ```no_run
//! use mwviews_client::{ClientConfig, PageviewsClient, ProjectViewsRequest};
//! use mwviews_core::Granularity;
//!
//! # async fn run() -> mwviews_core::Result<()> {
//! let client = PageviewsClient::new(ClientConfig::default().with_parallelism(4))?;
//! let request = ProjectViewsRequest::new(["en.wikipedia", "de.wikipedia"])
//!     .with_granularity(Granularity::Monthly)
//!     .with_start("20240101")
//!     .with_end("20240601");
//!
//! let table = client.project_views(&request).await?;
//! println!("{}", serde_json::to_string_pretty(&table)?);
//! # Ok(())
//! # }
//! ```

pub mod aggregation;
pub mod classifier;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod fetcher;

pub use client::{
    ArticleViewsRequest, DEFAULT_TOP_LIMIT, PageviewsClient, ProjectViewsRequest,
    TopArticlesRequest,
};
pub use config::{ClientConfig, DEFAULT_PARALLELISM, DEFAULT_USER_AGENT};
pub use fetcher::{FetchOutcome, Fetcher, RawResult, ReqwestTransport, Transport};
