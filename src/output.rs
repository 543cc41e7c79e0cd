//! Output formatting for mwviews
//!
//! This module renders query results either as terminal tables or as JSON:
//! - Table format lays out one row per timestamp and one column per subject,
//!   with a bold totals row at the bottom
//! - JSON format keeps absent cells as `null` so they stay distinguishable
//!   from reported zeros
//!
//! # Examples
//!
//! ```
//! use mwviews::output::get_formatter;
//! use mwviews_core::{Granularity, PageviewTable, Timestamp};
//!
//! let day = Timestamp::parse("20240101").unwrap();
//! let mut table = PageviewTable::seeded([day], &["Cat".to_string()]);
//! table.set(day, "Cat", 1234);
//!
//! let formatter = get_formatter(false);
//! let rendered = formatter.format_views(&table, Granularity::Daily);
//! assert!(rendered.contains("1,234"));
//! ```

use mwviews_core::{Granularity, PageviewTable, Timestamp, TopArticleEntry, ViewCount};
use prettytable::{Cell, Row, Table, format, row};
use serde_json::json;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a date-indexed view table
    fn format_views(&self, table: &PageviewTable, granularity: Granularity) -> String;

    /// Format a top-articles ranking
    fn format_top(&self, entries: &[TopArticleEntry]) -> String;
}

/// Table formatter for human-readable output
pub struct TableFormatter;

impl TableFormatter {
    /// Format a number with thousands separators
    fn format_number(n: u64) -> String {
        let digits = n.to_string();
        let lead = digits.len() % 3;
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

        for (i, digit) in digits.char_indices() {
            if i > 0 && (i + 3 - lead) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        grouped
    }

    /// Absent cells render as a dash
    fn format_count(views: ViewCount) -> String {
        views.map_or_else(|| "-".to_string(), Self::format_number)
    }

    /// Timestamp label at the precision of the granularity
    fn format_timestamp(ts: Timestamp, granularity: Granularity) -> String {
        let pattern = match granularity {
            Granularity::Hourly => "%Y-%m-%d %H:00",
            Granularity::Daily => "%Y-%m-%d",
            Granularity::Monthly => "%Y-%m",
        };
        ts.inner().format(pattern).to_string()
    }
}

impl OutputFormatter for TableFormatter {
    fn format_views(&self, data: &PageviewTable, granularity: Granularity) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        let mut titles = vec![Cell::new("Date").style_spec("b")];
        titles.extend(data.subjects().iter().map(|s| Cell::new(s).style_spec("b")));
        table.set_titles(Row::new(titles));

        for (ts, row) in data.rows() {
            let mut cells = vec![Cell::new(&Self::format_timestamp(*ts, granularity))];
            cells.extend(data.subjects().iter().map(|subject| {
                let views = row.get(subject).copied().flatten();
                Cell::new(&Self::format_count(views)).style_spec("r")
            }));
            table.add_row(Row::new(cells));
        }

        let totals = data.totals();
        let mut total_cells = vec![Cell::new("TOTAL").style_spec("b")];
        total_cells.extend(data.subjects().iter().map(|subject| {
            let views = totals.get(subject).copied().flatten();
            Cell::new(&Self::format_count(views)).style_spec("br")
        }));
        table.add_row(Row::new(total_cells));

        table.to_string()
    }

    fn format_top(&self, entries: &[TopArticleEntry]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> "Rank", b -> "Article", b -> "Views"]);

        for entry in entries {
            table.add_row(row![
                r -> entry.rank,
                entry.article.replace('_', " "),
                r -> Self::format_number(entry.views)
            ]);
        }

        let total: u64 = entries.iter().map(|e| e.views).sum();
        table.add_row(row![b -> "TOTAL", "", br -> Self::format_number(total)]);

        table.to_string()
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_views(&self, table: &PageviewTable, granularity: Granularity) -> String {
        let output = json!({
            "granularity": granularity.as_str(),
            "subjects": table.subjects(),
            "rows": table,
            "totals": table.totals(),
        });

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_top(&self, entries: &[TopArticleEntry]) -> String {
        let output = json!({
            "articles": entries,
            "total_views": entries.iter().map(|e| e.views).sum::<u64>(),
        });

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Factory function to create the appropriate formatter
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}
