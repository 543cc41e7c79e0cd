//! CLI interface for mwviews
//!
//! This module defines the command-line interface using clap. Each
//! subcommand maps onto one query of the pageviews client.
//!
//! # Example
//!
//! ```bash
//! # Daily views of two articles for January 2024
//! mwviews articles en.wikipedia "Albert Einstein" Physics --start 20240101 --end 20240131
//!
//! # Monthly aggregate views of two projects, as JSON
//! mwviews projects en.wikipedia de.wikipedia --granularity monthly --json
//!
//! # The ten most viewed articles yesterday
//! mwviews top en.wikipedia --limit 10
//! ```

use clap::{Args, Parser, Subcommand};
use mwviews_client::{
    ArticleViewsRequest, ClientConfig, DEFAULT_PARALLELISM, ProjectViewsRequest,
    TopArticlesRequest,
};
use mwviews_core::error::{MwviewsError, Result};
use mwviews_core::{Access, Agent, Granularity};
use std::time::Duration;

/// Query the Wikimedia pageviews API
#[derive(Parser, Debug, Clone)]
#[command(name = "mwviews")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Maximum number of requests in flight
    #[arg(long, env = "MWVIEWS_PARALLELISM", default_value_t = DEFAULT_PARALLELISM, global = true)]
    pub parallelism: usize,

    /// Extra request header as "Name: value" (repeatable)
    #[arg(long = "header", short = 'H', global = true)]
    pub headers: Vec<String>,

    /// User-Agent sent with every request
    #[arg(long, env = "MWVIEWS_USER_AGENT", global = true)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "MWVIEWS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Only show warnings and errors
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show debug output, including every request
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

// ---------------------------------------------------------------------------
// Shared argument structs
// ---------------------------------------------------------------------------

/// Filters shared by the series commands
#[derive(Args, Debug, Clone)]
pub struct SeriesArgs {
    /// Access method: all-access, desktop, mobile-app, mobile-web
    #[arg(long, default_value = "all-access")]
    pub access: Access,

    /// Agent type: all-agents, user, spider, automated
    #[arg(long, default_value = "all-agents")]
    pub agent: Agent,

    /// Bucket size: hourly, daily, monthly
    #[arg(long, default_value = "daily")]
    pub granularity: Granularity,

    /// First timestamp (YYYYMMDD or YYYYMMDDHH), defaults to 30 days before end
    #[arg(long)]
    pub start: Option<String>,

    /// Last timestamp (YYYYMMDD or YYYYMMDDHH), defaults to today
    #[arg(long)]
    pub end: Option<String>,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Views of individual articles in one project
    Articles {
        /// Project domain, e.g. en.wikipedia
        project: String,

        /// Article titles, spaces or underscores
        #[arg(required = true)]
        articles: Vec<String>,

        #[command(flatten)]
        series: SeriesArgs,
    },

    /// Aggregate views of whole projects
    Projects {
        /// Project domains, e.g. en.wikipedia de.wikipedia
        #[arg(required = true)]
        projects: Vec<String>,

        #[command(flatten)]
        series: SeriesArgs,
    },

    /// Most viewed articles of a project on one day
    Top {
        /// Project domain, e.g. en.wikipedia
        project: String,

        /// Access method: all-access, desktop, mobile-app, mobile-web
        #[arg(long, default_value = "all-access")]
        access: Access,

        /// Year, defaults to yesterday's
        #[arg(long)]
        year: Option<i32>,

        /// Month, defaults to yesterday's
        #[arg(long)]
        month: Option<u32>,

        /// Day, defaults to yesterday's
        #[arg(long)]
        day: Option<u32>,

        /// Maximum number of articles to show
        #[arg(long, default_value_t = mwviews_client::DEFAULT_TOP_LIMIT)]
        limit: usize,
    },
}

impl Cli {
    /// Build the client configuration from the global flags
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::default().with_parallelism(self.parallelism);
        for header in &self.headers {
            let (name, value) = parse_header(header)?;
            config = config.with_header(name, value);
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }
}

impl SeriesArgs {
    fn apply_article(&self, mut request: ArticleViewsRequest) -> ArticleViewsRequest {
        request = request
            .with_access(self.access)
            .with_agent(self.agent)
            .with_granularity(self.granularity);
        if let Some(start) = &self.start {
            request = request.with_start(start.as_str());
        }
        if let Some(end) = &self.end {
            request = request.with_end(end.as_str());
        }
        request
    }

    fn apply_project(&self, mut request: ProjectViewsRequest) -> ProjectViewsRequest {
        request = request
            .with_access(self.access)
            .with_agent(self.agent)
            .with_granularity(self.granularity);
        if let Some(start) = &self.start {
            request = request.with_start(start.as_str());
        }
        if let Some(end) = &self.end {
            request = request.with_end(end.as_str());
        }
        request
    }
}

/// Build the article query for `mwviews articles`
pub fn article_request(project: &str, articles: &[String], series: &SeriesArgs) -> ArticleViewsRequest {
    series.apply_article(ArticleViewsRequest::new(project, articles.iter().cloned()))
}

/// Build the aggregate query for `mwviews projects`
pub fn project_request(projects: &[String], series: &SeriesArgs) -> ProjectViewsRequest {
    series.apply_project(ProjectViewsRequest::new(projects.iter().cloned()))
}

/// Build the ranking query for `mwviews top`
pub fn top_request(
    project: &str,
    access: Access,
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    limit: usize,
) -> TopArticlesRequest {
    TopArticlesRequest {
        year,
        month,
        day,
        ..TopArticlesRequest::new(project)
            .with_access(access)
            .with_limit(limit)
    }
}

/// Parse a `Name: value` header argument
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw.split_once(':').ok_or_else(|| {
        MwviewsError::InvalidArgument(format!("header '{raw}' must look like 'Name: value'"))
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(MwviewsError::InvalidArgument(format!(
            "header '{raw}' has an empty name"
        )));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
