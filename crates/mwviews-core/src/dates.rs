//! Date normalization for pageview queries
//!
//! Callers may give start and end points as calendar dates, date-times, or
//! compact `YYYYMMDD[HH]` strings. This module turns them into [`Timestamp`]s,
//! fills in the default range, and walks the buckets between two endpoints.

use crate::error::{MwviewsError, Result};
use crate::types::{Granularity, Timestamp};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

/// Number of days covered by the default range when no start is given
pub const DEFAULT_RANGE_DAYS: i64 = 30;

/// A flexible start or end argument
///
/// # Examples
/// ```
/// use mwviews_core::dates::DateInput;
/// use chrono::NaiveDate;
///
/// let from_text = DateInput::from("20240115").resolve().unwrap();
/// let from_date = DateInput::from(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
///     .resolve()
///     .unwrap();
/// assert_eq!(from_text, from_date);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    /// A calendar date, hour `00`
    Date(NaiveDate),
    /// A date-time, truncated to the hour
    DateTime(NaiveDateTime),
    /// A compact `YYYYMMDD[HH]` string
    Text(String),
}

impl DateInput {
    /// Convert into a canonical timestamp
    pub fn resolve(&self) -> Result<Timestamp> {
        match self {
            Self::Date(date) => Ok(Timestamp::from_date(*date)),
            Self::DateTime(dt) => Ok(Timestamp::from_datetime(*dt)),
            Self::Text(text) => Timestamp::parse(text),
        }
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Resolve optional start/end arguments into a concrete inclusive range
///
/// `end` defaults to `today`; `start` defaults to 30 days before the
/// resolved end, keeping its hour.
pub fn resolve_range(
    start: Option<&DateInput>,
    end: Option<&DateInput>,
    today: NaiveDate,
) -> Result<(Timestamp, Timestamp)> {
    let end = match end {
        Some(input) => input.resolve()?,
        None => Timestamp::from_date(today),
    };
    let start = match start {
        Some(input) => input.resolve()?,
        None => end.checked_sub_days(DEFAULT_RANGE_DAYS).ok_or_else(|| {
            MwviewsError::MalformedDate(format!("cannot go {DEFAULT_RANGE_DAYS} days before {end}"))
        })?,
    };

    if start > end {
        return Err(MwviewsError::InvalidArgument(format!(
            "start {start} is after end {end}"
        )));
    }

    debug!("Resolved date range {} to {}", start, end);
    Ok((start, end))
}

/// The day before `today`
pub fn yesterday(today: NaiveDate) -> NaiveDate {
    today.pred_opt().unwrap_or(today)
}

/// Buckets from `start` to `end` (inclusive) at the given granularity
///
/// # Examples
/// ```
/// use mwviews_core::dates::sequence;
/// use mwviews_core::types::{Granularity, Timestamp};
///
/// let start = Timestamp::parse("20240130").unwrap();
/// let end = Timestamp::parse("20240202").unwrap();
/// let days: Vec<String> = sequence(start, end, Granularity::Daily)
///     .map(|ts| ts.to_string())
///     .collect();
/// assert_eq!(days, ["2024013000", "2024013100", "2024020100", "2024020200"]);
/// ```
pub fn sequence(start: Timestamp, end: Timestamp, granularity: Granularity) -> TimestampSequence {
    TimestampSequence {
        start,
        end,
        granularity,
        step: 0,
    }
}

/// Lazy, restartable walk over the buckets of a range
///
/// Each item is computed as `start + n * increment`, so cloning the value
/// restarts the walk from wherever the clone was taken.
#[derive(Debug, Clone)]
pub struct TimestampSequence {
    start: Timestamp,
    end: Timestamp,
    granularity: Granularity,
    step: u32,
}

impl Iterator for TimestampSequence {
    type Item = Timestamp;

    fn next(&mut self) -> Option<Timestamp> {
        let current = self.granularity.advance(self.start, self.step)?;
        if current > self.end {
            return None;
        }
        self.step = self.step.checked_add(1)?;
        Some(current)
    }
}

impl std::iter::FusedIterator for TimestampSequence {}
