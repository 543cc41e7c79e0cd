//! Core types, date handling, and errors for mwviews
//!
//! This crate provides the foundational types shared by the pageviews
//! client and the command line front end.

pub mod dates;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use dates::{DateInput, TimestampSequence, resolve_range, sequence, yesterday};
pub use error::{MwviewsError, Result};
pub use types::{
    Access, Agent, Granularity, PageviewTable, Timestamp, TopArticleEntry, ViewCount,
};
