//! Pageviews API client
//!
//! [`PageviewsClient`] runs every query through the same pipeline: normalize
//! the arguments, plan the URLs, fetch them with bounded parallelism,
//! classify the batch, and aggregate what came back.

use crate::aggregation::{
    ArticleItem, ProjectItem, SubjectItem, merge, rank_top_articles, ranking_count,
    roll_up_monthly,
};
use crate::classifier::{classify, has_items};
use crate::config::ClientConfig;
use crate::endpoints::{article_urls, normalize_title, project_urls, top_url};
use crate::fetcher::{Fetcher, RawResult, ReqwestTransport, Transport};
use chrono::{Datelike, NaiveDate, Utc};
use mwviews_core::dates::{DateInput, resolve_range, sequence, yesterday};
use mwviews_core::error::{MwviewsError, Result};
use mwviews_core::types::{Access, Agent, Granularity, PageviewTable, TopArticleEntry};
use std::sync::Arc;
use tracing::{error, info};

/// Default maximum number of ranked articles returned
pub const DEFAULT_TOP_LIMIT: usize = 1000;

/// Daily or monthly views for a set of articles in one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleViewsRequest {
    pub project: String,
    pub articles: Vec<String>,
    pub access: Access,
    pub agent: Agent,
    pub granularity: Granularity,
    pub start: Option<DateInput>,
    pub end: Option<DateInput>,
}

impl ArticleViewsRequest {
    pub fn new<I, S>(project: impl Into<String>, articles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            project: project.into(),
            articles: articles.into_iter().map(Into::into).collect(),
            access: Access::default(),
            agent: Agent::default(),
            granularity: Granularity::Daily,
            start: None,
            end: None,
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_start(mut self, start: impl Into<DateInput>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn with_end(mut self, end: impl Into<DateInput>) -> Self {
        self.end = Some(end.into());
        self
    }
}

/// Aggregate views for whole projects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectViewsRequest {
    pub projects: Vec<String>,
    pub access: Access,
    pub agent: Agent,
    pub granularity: Granularity,
    pub start: Option<DateInput>,
    pub end: Option<DateInput>,
}

impl ProjectViewsRequest {
    pub fn new<I, S>(projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            projects: projects.into_iter().map(Into::into).collect(),
            access: Access::default(),
            agent: Agent::default(),
            granularity: Granularity::Daily,
            start: None,
            end: None,
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agent = agent;
        self
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_start(mut self, start: impl Into<DateInput>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn with_end(mut self, end: impl Into<DateInput>) -> Self {
        self.end = Some(end.into());
        self
    }
}

/// The most viewed articles of a project on one day
///
/// Unset date parts are taken from yesterday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopArticlesRequest {
    pub project: String,
    pub access: Access,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub limit: usize,
}

impl TopArticlesRequest {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            access: Access::default(),
            year: None,
            month: None,
            day: None,
            limit: DEFAULT_TOP_LIMIT,
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Client for the Wikimedia pageviews API
///
/// # Examples
/// ```no_run
/// use mwviews_client::{ArticleViewsRequest, ClientConfig, PageviewsClient};
///
/// # async fn run() -> mwviews_core::Result<()> {
/// let client = PageviewsClient::new(ClientConfig::default())?;
/// let request = ArticleViewsRequest::new("en.wikipedia", ["Cat", "Dog"])
///     .with_start("20240101")
///     .with_end("20240107");
///
/// let table = client.article_views(&request).await?;
/// for (day, row) in table.rows() {
///     println!("{day}: {row:?}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct PageviewsClient {
    config: ClientConfig,
    fetcher: Fetcher,
    today: Option<NaiveDate>,
}

impl PageviewsClient {
    /// Create a client that talks to the live API
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Self::with_transport(config, transport)
    }

    /// Create a client on top of a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(transport, config.parallelism);
        Ok(Self {
            config,
            fetcher,
            today: None,
        })
    }

    /// Show a progress bar while batches are fetched
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.fetcher = self.fetcher.with_progress(show_progress);
        self
    }

    /// Pin the date that defaults are computed from
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Views per article over a date range
    ///
    /// The table has one row per day (or per month with
    /// [`Granularity::Monthly`]) and one column per normalized title.
    pub async fn article_views(&self, request: &ArticleViewsRequest) -> Result<PageviewTable> {
        if request.granularity == Granularity::Hourly {
            return Err(MwviewsError::UnsupportedGranularity(
                "hourly (article views are daily or monthly)".to_string(),
            ));
        }
        if request.articles.is_empty() {
            return Err(MwviewsError::InvalidArgument(
                "at least one article is required".to_string(),
            ));
        }

        let (start, end) =
            resolve_range(request.start.as_ref(), request.end.as_ref(), self.today())?;
        let titles: Vec<String> = request.articles.iter().map(|a| normalize_title(a)).collect();
        let urls = article_urls(
            &request.project,
            &request.articles,
            request.access,
            request.agent,
            start,
            end,
        );

        let table = PageviewTable::seeded(sequence(start, end, Granularity::Daily), &titles);
        let daily = self.run_series::<ArticleItem>(&urls, table).await?;

        Ok(match request.granularity {
            Granularity::Monthly => roll_up_monthly(&daily),
            _ => daily,
        })
    }

    /// Aggregate views per project over a date range
    pub async fn project_views(&self, request: &ProjectViewsRequest) -> Result<PageviewTable> {
        if request.projects.is_empty() {
            return Err(MwviewsError::InvalidArgument(
                "at least one project is required".to_string(),
            ));
        }

        let (start, end) =
            resolve_range(request.start.as_ref(), request.end.as_ref(), self.today())?;
        let urls = project_urls(
            &request.projects,
            request.access,
            request.agent,
            request.granularity,
            start,
            end,
        );

        // monthly buckets are reported at the first of each month
        let first = match request.granularity {
            Granularity::Monthly => start.truncate_to_month(),
            _ => start,
        };
        let table = PageviewTable::seeded(
            sequence(first, end, request.granularity),
            &request.projects,
        );
        self.run_series::<ProjectItem>(&urls, table).await
    }

    /// The ranked most-viewed articles for one day
    pub async fn top_articles(&self, request: &TopArticlesRequest) -> Result<Vec<TopArticleEntry>> {
        let fallback = yesterday(self.today());
        let year = request.year.unwrap_or(fallback.year());
        let month = request.month.unwrap_or(fallback.month());
        let day = request.day.unwrap_or(fallback.day());
        if NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(MwviewsError::MalformedDate(format!(
                "{year:04}-{month:02}-{day:02} is not a valid date"
            )));
        }

        let url = top_url(&request.project, request.access, year, month, day);
        let results = self.fetcher.fetch_all(std::slice::from_ref(&url)).await;

        let outcome = results
            .first()
            .ok_or_else(|| MwviewsError::NoUsableData {
                urls: vec![url.clone()],
            })
            .and_then(|result| {
                let usable = ranking_count(result) == Some(1);
                classify(&results, usable)?;
                rank_top_articles(result, request.limit)
            });

        match outcome {
            Ok(articles) => {
                info!(project = %request.project, articles = articles.len(), "Fetched top articles");
                Ok(articles)
            }
            Err(e) => {
                error!(url = %url, error = %e, "Error while fetching top articles");
                Err(e)
            }
        }
    }

    async fn run_series<T: SubjectItem>(
        &self,
        urls: &[String],
        mut table: PageviewTable,
    ) -> Result<PageviewTable> {
        let results = self.fetcher.fetch_all(urls).await;
        match Self::aggregate::<T>(&results, &mut table) {
            Ok(()) => {
                info!(requests = urls.len(), rows = table.len(), "Aggregated pageviews");
                Ok(table)
            }
            Err(e) => {
                error!(urls = ?urls, error = %e, "Error while fetching and parsing pageviews");
                Err(e)
            }
        }
    }

    fn aggregate<T: SubjectItem>(results: &[RawResult], table: &mut PageviewTable) -> Result<()> {
        classify(results, results.iter().any(has_items))?;
        merge::<T>(table, results)?;
        Ok(())
    }
}
