//! Batch-level verdicts on fetched results
//!
//! A rate limit anywhere in the batch wins over everything else. Otherwise
//! the batch fails only when nothing in it was usable, and the error lists
//! every URL that was requested.

use crate::fetcher::RawResult;
use mwviews_core::error::{MwviewsError, Result};
use tracing::warn;

/// Whether a result's JSON body carries an `items` section
pub fn has_items(result: &RawResult) -> bool {
    result.body().is_some_and(|body| body.get("items").is_some())
}

/// Decide whether a fetched batch may be aggregated
///
/// `has_usable_data` is the caller's judgment of the batch contents, since
/// what counts as usable differs between series queries and rankings.
pub fn classify(results: &[RawResult], has_usable_data: bool) -> Result<()> {
    if let Some(limited) = results.iter().find(|r| r.is_rate_limited()) {
        warn!(url = %limited.url, "Rate limited by the pageview API");
        return Err(MwviewsError::RateLimitExceeded);
    }

    if !has_usable_data {
        return Err(MwviewsError::NoUsableData {
            urls: results.iter().map(|r| r.url.clone()).collect(),
        });
    }

    Ok(())
}
