//! Request planning for the pageviews REST API
//!
//! Builds the URL list for one logical query: one URL per article or per
//! project, in the order the subjects were given.

use mwviews_core::types::{Access, Agent, Granularity, Timestamp};

/// Per-article endpoint base
pub const ARTICLE_ENDPOINT: &str =
    "https://wikimedia.org/api/rest_v1/metrics/pageviews/per-article";

/// Project aggregate endpoint base
pub const AGGREGATE_ENDPOINT: &str =
    "https://wikimedia.org/api/rest_v1/metrics/pageviews/aggregate";

/// Top articles endpoint base
pub const TOP_ENDPOINT: &str = "https://wikimedia.org/api/rest_v1/metrics/pageviews/top";

/// Article titles use underscores in place of spaces
///
/// # Examples
/// ```
/// use mwviews_client::endpoints::normalize_title;
///
/// assert_eq!(normalize_title("Albert Einstein"), "Albert_Einstein");
/// ```
pub fn normalize_title(title: &str) -> String {
    title.replace(' ', "_")
}

/// One per-article URL for each article, in input order
///
/// Titles are normalized and then percent-encoded, `/` included. The
/// per-article endpoint is always queried daily; monthly figures are
/// rolled up on the client.
pub fn article_urls(
    project: &str,
    articles: &[String],
    access: Access,
    agent: Agent,
    start: Timestamp,
    end: Timestamp,
) -> Vec<String> {
    articles
        .iter()
        .map(|article| {
            let encoded = urlencoding::encode(&normalize_title(article)).into_owned();
            format!(
                "{ARTICLE_ENDPOINT}/{project}/{access}/{agent}/{encoded}/{daily}/{start}/{end}",
                daily = Granularity::Daily,
            )
        })
        .collect()
}

/// One aggregate URL for each project, in input order
pub fn project_urls(
    projects: &[String],
    access: Access,
    agent: Agent,
    granularity: Granularity,
    start: Timestamp,
    end: Timestamp,
) -> Vec<String> {
    projects
        .iter()
        .map(|project| {
            format!("{AGGREGATE_ENDPOINT}/{project}/{access}/{agent}/{granularity}/{start}/{end}")
        })
        .collect()
}

/// URL of the top-articles ranking for one day
pub fn top_url(project: &str, access: Access, year: i32, month: u32, day: u32) -> String {
    format!("{TOP_ENDPOINT}/{project}/{access}/{year}/{month:02}/{day:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn test_article_urls_keep_order_and_encode() {
        let articles = vec![
            "Albert Einstein".to_string(),
            "AC/DC".to_string(),
            "Café".to_string(),
        ];
        let urls = article_urls(
            "en.wikipedia",
            &articles,
            Access::AllAccess,
            Agent::User,
            ts("20230101"),
            ts("20230131"),
        );

        assert_eq!(urls.len(), 3);
        assert_eq!(
            urls[0],
            "https://wikimedia.org/api/rest_v1/metrics/pageviews/per-article/en.wikipedia/all-access/user/Albert_Einstein/daily/2023010100/2023013100"
        );
        assert!(urls[1].contains("/AC%2FDC/daily/"));
        assert!(urls[2].contains("/Caf%C3%A9/daily/"));
    }

    #[test]
    fn test_project_urls_pass_granularity_through() {
        let projects = vec!["en.wikipedia".to_string(), "de.wikipedia".to_string()];
        let urls = project_urls(
            &projects,
            Access::MobileWeb,
            Agent::AllAgents,
            Granularity::Hourly,
            ts("2023010100"),
            ts("2023010123"),
        );

        assert_eq!(
            urls,
            vec![
                "https://wikimedia.org/api/rest_v1/metrics/pageviews/aggregate/en.wikipedia/mobile-web/all-agents/hourly/2023010100/2023010123",
                "https://wikimedia.org/api/rest_v1/metrics/pageviews/aggregate/de.wikipedia/mobile-web/all-agents/hourly/2023010100/2023010123",
            ]
        );
    }

    #[test]
    fn test_top_url_pads_month_and_day() {
        assert_eq!(
            top_url("en.wikipedia", Access::Desktop, 2023, 1, 5),
            "https://wikimedia.org/api/rest_v1/metrics/pageviews/top/en.wikipedia/desktop/2023/01/05"
        );
    }

    #[test]
    fn test_normalize_title_only_touches_spaces() {
        assert_eq!(normalize_title("New York City"), "New_York_City");
        assert_eq!(normalize_title("Already_Fine"), "Already_Fine");
    }
}
