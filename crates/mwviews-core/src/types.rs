//! Core domain types for mwviews
//!
//! This module contains the fundamental types shared by the client and the
//! command line front end: the hour-truncated [`Timestamp`], the request
//! dimensions ([`Granularity`], [`Access`], [`Agent`]), and the result shapes
//! ([`PageviewTable`], [`TopArticleEntry`]).

use crate::error::{MwviewsError, Result};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Length of the canonical compact timestamp form (`YYYYMMDDHH`)
pub const TIMESTAMP_LEN: usize = 10;

/// A point in time truncated to the hour
///
/// The canonical textual form is the 10-character compact string used by
/// the pageviews API, e.g. `2024011500`.
///
/// # Examples
/// ```
/// use mwviews_core::types::Timestamp;
///
/// let ts = Timestamp::parse("20240115").unwrap();
/// assert_eq!(ts.to_string(), "2024011500");
///
/// let hourly = Timestamp::parse("2024011513").unwrap();
/// assert_eq!(hourly.hour(), 13);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Parse a compact `YYYYMMDD[HH]` string
    ///
    /// The input is right-padded with `'0'` to 10 characters, so a plain
    /// date resolves to hour `00`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.len() < 8
            || trimmed.len() > TIMESTAMP_LEN
            || !trimmed.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(MwviewsError::MalformedDate(format!(
                "'{input}', expected YYYYMMDD or YYYYMMDDHH"
            )));
        }

        let padded = format!("{trimmed:0<width$}", width = TIMESTAMP_LEN);
        // All bytes are ASCII digits, so these slices and parses cannot fail
        let field = |range: std::ops::Range<usize>| padded[range].parse::<u32>().unwrap_or(0);
        let (year, month, day, hour) = (field(0..4), field(4..6), field(6..8), field(8..10));

        NaiveDate::from_ymd_opt(year as i32, month, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .map(Self)
            .ok_or_else(|| MwviewsError::MalformedDate(format!("'{input}' is not a valid date")))
    }

    /// Create a timestamp from a calendar date at hour `00`
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN))
    }

    /// Create a timestamp from a date-time, dropping minutes and seconds
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        let hour = NaiveTime::from_hms_opt(dt.hour(), 0, 0).unwrap_or(NaiveTime::MIN);
        Self(dt.date().and_time(hour))
    }

    /// Create a timestamp from its components
    pub fn from_ymdh(year: i32, month: u32, day: u32, hour: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, 0, 0))
            .map(Self)
            .ok_or_else(|| {
                MwviewsError::MalformedDate(format!(
                    "{year:04}-{month:02}-{day:02} {hour:02}h is not a valid date"
                ))
            })
    }

    /// Render the canonical 10-character form
    pub fn format(&self) -> String {
        format!(
            "{:04}{:02}{:02}{:02}",
            self.0.year(),
            self.0.month(),
            self.0.day(),
            self.0.hour()
        )
    }

    /// First day of this timestamp's month, hour stripped
    pub fn truncate_to_month(&self) -> Self {
        let date = self.0.date();
        Self::from_date(date.with_day(1).unwrap_or(date))
    }

    /// Get the inner NaiveDateTime
    pub fn inner(&self) -> &NaiveDateTime {
        &self.0
    }

    /// Calendar date part
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// Hour of day (0-23)
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Shift by a number of days, `None` on overflow
    pub fn checked_sub_days(&self, days: i64) -> Option<Self> {
        self.0.checked_sub_signed(Duration::days(days)).map(Self)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for Timestamp {
    type Err = MwviewsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for Timestamp {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(dt: NaiveDateTime) -> Self {
        Self::from_datetime(dt)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format())
    }
}

/// Time-bucket size of a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per hour
    Hourly,
    /// One bucket per day
    #[default]
    Daily,
    /// One bucket per calendar month
    Monthly,
}

impl Granularity {
    /// Path segment used by the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }

    /// `start` advanced by `steps` increments of this granularity
    ///
    /// Monthly steps are calendar months counted from `start`, so a start on
    /// the 31st clamps to the last day of shorter months without drifting.
    pub fn advance(&self, start: Timestamp, steps: u32) -> Option<Timestamp> {
        let inner = start.0;
        let shifted = match self {
            Self::Hourly => inner.checked_add_signed(Duration::hours(i64::from(steps))),
            Self::Daily => inner.checked_add_signed(Duration::days(i64::from(steps))),
            Self::Monthly => inner.checked_add_months(Months::new(steps)),
        };
        shifted.map(Timestamp)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = MwviewsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            _ => Err(MwviewsError::UnsupportedGranularity(s.to_string())),
        }
    }
}

/// Access method dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Access {
    #[default]
    AllAccess,
    Desktop,
    MobileApp,
    MobileWeb,
}

impl Access {
    /// Path segment used by the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllAccess => "all-access",
            Self::Desktop => "desktop",
            Self::MobileApp => "mobile-app",
            Self::MobileWeb => "mobile-web",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Access {
    type Err = MwviewsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all-access" => Ok(Self::AllAccess),
            "desktop" => Ok(Self::Desktop),
            "mobile-app" => Ok(Self::MobileApp),
            "mobile-web" => Ok(Self::MobileWeb),
            _ => Err(MwviewsError::InvalidArgument(format!(
                "unknown access '{s}', expected all-access, desktop, mobile-app or mobile-web"
            ))),
        }
    }
}

/// Requester type dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Agent {
    #[default]
    AllAgents,
    User,
    Spider,
    Automated,
}

impl Agent {
    /// Path segment used by the API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllAgents => "all-agents",
            Self::User => "user",
            Self::Spider => "spider",
            Self::Automated => "automated",
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Agent {
    type Err = MwviewsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all-agents" => Ok(Self::AllAgents),
            "user" => Ok(Self::User),
            "spider" => Ok(Self::Spider),
            // older API revisions called this agent type "bot"
            "automated" | "bot" => Ok(Self::Automated),
            _ => Err(MwviewsError::InvalidArgument(format!(
                "unknown agent '{s}', expected all-agents, user, spider or automated"
            ))),
        }
    }
}

/// View count for one subject at one timestamp
///
/// `None` means the API never reported this cell, which is not the same as
/// a reported zero.
pub type ViewCount = Option<u64>;

/// Date-indexed view counts
///
/// Maps each [`Timestamp`] to a mapping of subject (article title or project)
/// to [`ViewCount`]. Every row carries every subject the table was seeded
/// with; rows added after seeding start out with all subjects absent.
///
/// # Examples
/// ```
/// use mwviews_core::types::{PageviewTable, Timestamp};
///
/// let day = Timestamp::parse("20240101").unwrap();
/// let mut table = PageviewTable::seeded([day], &["Cat".to_string(), "Dog".to_string()]);
/// table.set(day, "Cat", 42);
///
/// assert_eq!(table.get(day, "Cat"), Some(Some(42)));
/// assert_eq!(table.get(day, "Dog"), Some(None));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageviewTable {
    subjects: Vec<String>,
    rows: BTreeMap<Timestamp, BTreeMap<String, ViewCount>>,
}

impl PageviewTable {
    /// Build a table with every subject absent at every timestamp
    pub fn seeded(timestamps: impl IntoIterator<Item = Timestamp>, subjects: &[String]) -> Self {
        let mut table = Self {
            subjects: Vec::with_capacity(subjects.len()),
            rows: BTreeMap::new(),
        };
        for subject in subjects {
            if !table.subjects.contains(subject) {
                table.subjects.push(subject.clone());
            }
        }
        for ts in timestamps {
            table.row_mut(ts);
        }
        table
    }

    /// Subjects in the order they were requested
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Row for `ts`, seeded with every subject absent if it did not exist
    pub fn row_mut(&mut self, ts: Timestamp) -> &mut BTreeMap<String, ViewCount> {
        let subjects = &self.subjects;
        self.rows
            .entry(ts)
            .or_insert_with(|| subjects.iter().map(|s| (s.clone(), None)).collect())
    }

    /// Record a reported view count
    ///
    /// A subject outside the seed becomes a new column, absent in every
    /// other row.
    pub fn set(&mut self, ts: Timestamp, subject: &str, views: u64) {
        self.add_subject(subject);
        self.row_mut(ts).insert(subject.to_string(), Some(views));
    }

    fn add_subject(&mut self, subject: &str) {
        if self.subjects.iter().any(|s| s == subject) {
            return;
        }
        self.subjects.push(subject.to_string());
        for row in self.rows.values_mut() {
            row.entry(subject.to_string()).or_insert(None);
        }
    }

    /// Look up a cell: `None` if the cell does not exist, `Some(None)` if absent
    pub fn get(&self, ts: Timestamp, subject: &str) -> Option<ViewCount> {
        self.rows.get(&ts).and_then(|row| row.get(subject)).copied()
    }

    /// Row for a single timestamp
    pub fn row(&self, ts: Timestamp) -> Option<&BTreeMap<String, ViewCount>> {
        self.rows.get(&ts)
    }

    /// Iterate rows in timestamp order
    pub fn rows(&self) -> impl Iterator<Item = (&Timestamp, &BTreeMap<String, ViewCount>)> {
        self.rows.iter()
    }

    /// Timestamps in ascending order
    pub fn timestamps(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.rows.keys().copied()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of reported views per subject; absent if a subject was never reported
    pub fn totals(&self) -> BTreeMap<String, ViewCount> {
        let mut totals: BTreeMap<String, ViewCount> =
            self.subjects.iter().map(|s| (s.clone(), None)).collect();
        for row in self.rows.values() {
            for (subject, views) in row {
                let slot = totals.entry(subject.clone()).or_insert(None);
                if let Some(views) = views {
                    *slot = Some(slot.unwrap_or(0).saturating_add(*views));
                }
            }
        }
        totals
    }
}

impl Serialize for PageviewTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

/// One entry of a top-articles ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopArticleEntry {
    /// Position in the ranking, 1 is the most viewed
    pub rank: u32,
    /// Article title as reported by the API
    pub article: String,
    /// View count for the ranked day
    pub views: u64,
}
