//! mwviews - Query the Wikimedia pageviews API
//!
//! This library provides functionality to:
//! - Fetch daily or monthly views for articles of one project
//! - Fetch hourly, daily, or monthly aggregate views for whole projects
//! - Fetch the ranked most-viewed articles of a project for one day
//! - Render results as terminal tables or JSON
//!
//! Requests for a query run concurrently with a configurable bound, and the
//! results are merged into date-indexed tables where missing data stays
//! distinguishable from zero views.
//!
//! # Examples
//!
//! ```no_run
//! use mwviews::{ArticleViewsRequest, ClientConfig, Granularity, PageviewsClient};
//!
//! #[tokio::main]
//! async fn main() -> mwviews::Result<()> {
//!     let client = PageviewsClient::new(ClientConfig::default())?;
//!
//!     let request = ArticleViewsRequest::new("en.wikipedia", ["Cat", "Dog"])
//!         .with_granularity(Granularity::Monthly)
//!         .with_start("20240101")
//!         .with_end("20240331");
//!     let table = client.article_views(&request).await?;
//!
//!     println!("{:?}", table.totals());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use mwviews_client::{
    ArticleViewsRequest, ClientConfig, PageviewsClient, ProjectViewsRequest, TopArticlesRequest,
    Transport,
};
pub use mwviews_core::{
    Access, Agent, DateInput, Granularity, MwviewsError, PageviewTable, Result, Timestamp,
    TopArticleEntry, ViewCount,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
