//! Merging fetched batches into result tables
//!
//! Series endpoints answer with an `items` array of per-timestamp counts.
//! Every usable body in a batch is folded into one [`PageviewTable`], keyed
//! by the item's subject field: `article` for per-article data and `project`
//! for aggregates. Per-article data can then be rolled up to calendar months.

use crate::fetcher::RawResult;
use mwviews_core::error::{MwviewsError, Result};
use mwviews_core::types::{PageviewTable, Timestamp, TopArticleEntry};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// An item that contributes one cell to a [`PageviewTable`]
pub trait SubjectItem: DeserializeOwned {
    /// Compact `YYYYMMDDHH` timestamp as sent by the server
    fn timestamp(&self) -> &str;
    /// Column the count belongs to
    fn subject(&self) -> &str;
    /// Reported views
    fn views(&self) -> u64;
}

/// Item of the per-article endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleItem {
    pub article: String,
    pub timestamp: String,
    pub views: u64,
}

impl SubjectItem for ArticleItem {
    fn timestamp(&self) -> &str {
        &self.timestamp
    }

    fn subject(&self) -> &str {
        &self.article
    }

    fn views(&self) -> u64 {
        self.views
    }
}

/// Item of the aggregate endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectItem {
    pub project: String,
    pub timestamp: String,
    pub views: u64,
}

impl SubjectItem for ProjectItem {
    fn timestamp(&self) -> &str {
        &self.timestamp
    }

    fn subject(&self) -> &str {
        &self.project
    }

    fn views(&self) -> u64 {
        self.views
    }
}

/// Item of the top endpoint: one ranking per item
#[derive(Debug, Clone, Deserialize)]
pub struct TopItem {
    pub articles: Vec<TopArticleEntry>,
}

/// Decode the `items` array of a result, if it has one
pub fn decode_items<T: DeserializeOwned>(result: &RawResult) -> Result<Option<Vec<T>>> {
    let Some(items) = result.body().and_then(|body| body.get("items")) else {
        return Ok(None);
    };

    Vec::<T>::deserialize(items)
        .map(Some)
        .map_err(|source| MwviewsError::Decode {
            url: result.url.clone(),
            source,
        })
}

/// Fold every usable result into `table`
///
/// Results without `items` are skipped. Returns whether any result was
/// usable.
pub fn merge<T: SubjectItem>(table: &mut PageviewTable, results: &[RawResult]) -> Result<bool> {
    let mut usable = false;
    for result in results {
        let Some(items) = decode_items::<T>(result)? else {
            debug!(url = %result.url, "Skipping result without items");
            continue;
        };
        usable = true;

        for item in &items {
            let ts = Timestamp::parse(item.timestamp())?;
            table.set(ts, item.subject(), item.views());
        }
    }
    Ok(usable)
}

/// Sum a daily table into calendar months
///
/// Each month row holds every subject of the source table. A subject stays
/// absent for a month only if none of its days in that month were reported;
/// a reported zero still counts.
pub fn roll_up_monthly(daily: &PageviewTable) -> PageviewTable {
    let months = daily.timestamps().map(|ts| ts.truncate_to_month());
    let mut monthly = PageviewTable::seeded(months, daily.subjects());

    for (ts, row) in daily.rows() {
        let month_row = monthly.row_mut(ts.truncate_to_month());
        for (subject, views) in row {
            let slot = month_row.entry(subject.clone()).or_insert(None);
            if let Some(views) = views {
                *slot = Some(slot.unwrap_or(0).saturating_add(*views));
            }
        }
    }

    monthly
}

/// Number of rankings in a top-articles result, if it has `items`
pub fn ranking_count(result: &RawResult) -> Option<usize> {
    result
        .body()
        .and_then(|body| body.get("items"))
        .and_then(|items| items.as_array())
        .map(|items| items.len())
}

/// Extract the ranking from a top-articles result
///
/// The body must hold exactly one ranking. Entries come back sorted by
/// ascending rank and truncated to `limit`.
pub fn rank_top_articles(result: &RawResult, limit: usize) -> Result<Vec<TopArticleEntry>> {
    let items = decode_items::<TopItem>(result)?.unwrap_or_default();
    let [ranking] = <[TopItem; 1]>::try_from(items).map_err(|_| MwviewsError::NoUsableData {
        urls: vec![result.url.clone()],
    })?;

    let mut articles = ranking.articles;
    articles.sort_by_key(|entry| entry.rank);
    articles.truncate(limit);
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchOutcome;
    use serde_json::{Value, json};

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn ok(url: &str, body: Value) -> RawResult {
        RawResult {
            url: url.to_string(),
            outcome: FetchOutcome::Response {
                status: 200,
                body: Some(body),
            },
        }
    }

    fn subjects(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_fills_cells_and_keeps_gaps() {
        let mut table = PageviewTable::seeded(
            [ts("20230101"), ts("20230102")],
            &subjects(&["Cat", "Dog"]),
        );
        let results = vec![
            ok(
                "cat",
                json!({ "items": [
                    { "article": "Cat", "timestamp": "2023010100", "views": 5 },
                    { "article": "Cat", "timestamp": "2023010200", "views": 7 }
                ]}),
            ),
            ok(
                "dog",
                json!({ "items": [
                    { "article": "Dog", "timestamp": "2023010100", "views": 3 }
                ]}),
            ),
        ];

        assert!(merge::<ArticleItem>(&mut table, &results).unwrap());
        assert_eq!(table.get(ts("20230101"), "Cat"), Some(Some(5)));
        assert_eq!(table.get(ts("20230102"), "Cat"), Some(Some(7)));
        assert_eq!(table.get(ts("20230101"), "Dog"), Some(Some(3)));
        assert_eq!(table.get(ts("20230102"), "Dog"), Some(None));
    }

    #[test]
    fn test_merge_skips_bodies_without_items() {
        let mut table = PageviewTable::seeded([ts("20230101")], &subjects(&["en.wikipedia"]));
        let results = vec![
            ok("a", json!({ "title": "Not found." })),
            RawResult::failed("b", "timeout"),
        ];

        assert!(!merge::<ProjectItem>(&mut table, &results).unwrap());
        assert_eq!(table.get(ts("20230101"), "en.wikipedia"), Some(None));
    }

    #[test]
    fn test_merge_reports_malformed_items() {
        let mut table = PageviewTable::default();
        let results = vec![ok("bad", json!({ "items": [{ "timestamp": "2023010100" }] }))];

        let err = merge::<ProjectItem>(&mut table, &results).unwrap_err();
        assert!(matches!(err, MwviewsError::Decode { ref url, .. } if url == "bad"));
    }

    #[test]
    fn test_roll_up_monthly() {
        let mut daily = PageviewTable::seeded(
            [ts("20230130"), ts("20230131"), ts("20230201")],
            &subjects(&["Cat", "Dog"]),
        );
        daily.set(ts("20230130"), "Cat", 2);
        daily.set(ts("20230131"), "Cat", 3);
        daily.set(ts("20230201"), "Cat", 4);
        daily.set(ts("20230131"), "Dog", 0);

        let monthly = roll_up_monthly(&daily);

        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly.get(ts("20230101"), "Cat"), Some(Some(5)));
        assert_eq!(monthly.get(ts("20230201"), "Cat"), Some(Some(4)));
        assert_eq!(monthly.get(ts("20230101"), "Dog"), Some(Some(0)));
        assert_eq!(monthly.get(ts("20230201"), "Dog"), Some(None));
    }

    #[test]
    fn test_roll_up_saturates_huge_counts() {
        let mut daily = PageviewTable::seeded(
            [ts("20230101"), ts("20230102")],
            &subjects(&["Cat"]),
        );
        daily.set(ts("20230101"), "Cat", u64::MAX - 1);
        daily.set(ts("20230102"), "Cat", 10);

        let monthly = roll_up_monthly(&daily);
        assert_eq!(monthly.get(ts("20230101"), "Cat"), Some(Some(u64::MAX)));
    }

    #[test]
    fn test_merge_keeps_unrequested_subject_visible() {
        let mut table = PageviewTable::seeded(
            [ts("20230101"), ts("20230102")],
            &subjects(&["en.wikipedia.org"]),
        );
        let results = vec![ok(
            "agg",
            json!({ "items": [
                { "project": "en.wikipedia", "timestamp": "2023010100", "views": 123456 }
            ]}),
        )];

        assert!(merge::<ProjectItem>(&mut table, &results).unwrap());
        assert_eq!(table.subjects(), ["en.wikipedia.org", "en.wikipedia"]);
        assert_eq!(table.get(ts("20230102"), "en.wikipedia"), Some(None));
    }

    #[test]
    fn test_rank_top_articles_sorts_then_truncates() {
        let result = ok(
            "top",
            json!({ "items": [{ "articles": [
                { "rank": 3, "article": "C", "views": 10 },
                { "rank": 1, "article": "A", "views": 30 },
                { "rank": 2, "article": "B", "views": 20 }
            ]}]}),
        );

        assert_eq!(ranking_count(&result), Some(1));
        let top = rank_top_articles(&result, 2).unwrap();
        let titles: Vec<&str> = top.iter().map(|e| e.article.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_rank_top_articles_requires_single_ranking() {
        let result = ok("top", json!({ "items": [] }));
        assert_eq!(ranking_count(&result), Some(0));
        assert!(matches!(
            rank_top_articles(&result, 10),
            Err(MwviewsError::NoUsableData { .. })
        ));
    }
}
