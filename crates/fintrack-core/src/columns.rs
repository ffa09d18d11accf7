//! Column role detection for tabular statement exports
//!
//! Bank CSVs disagree on header names ("Transaction Date" vs "txn_date",
//! "Amount" vs "Debit"), and some have no recognizable headers at all. The
//! detector first matches headers against configured synonyms, then falls
//! back to sniffing column contents.

use crate::config::ColumnSynonyms;
use crate::normalize::{normalize_amount, normalize_date};

/// Number of leading non-empty values sampled when sniffing a date column
const DATE_SAMPLE_SIZE: usize = 5;

/// A header row plus data rows, all as raw strings
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Non-empty (trimmed) values of one column, in row order
    fn non_empty_values(&self, column: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(column))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// Column indices chosen for each role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectedColumns {
    pub date: Option<usize>,
    pub description: Option<usize>,
    pub amount: Option<usize>,
}

/// Identifies which columns hold the date, description and amount
pub struct ColumnDetector<'a> {
    synonyms: &'a ColumnSynonyms,
}

impl<'a> ColumnDetector<'a> {
    pub fn new(synonyms: &'a ColumnSynonyms) -> Self {
        Self { synonyms }
    }

    pub fn detect(&self, table: &Table) -> DetectedColumns {
        // A posted-date header only takes the date role when nothing else can
        let posted: Vec<usize> = table
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| self.synonyms.posted_date.contains(&h.trim().to_lowercase()))
            .map(|(idx, _)| idx)
            .collect();
        let mut date = find_header(&table.headers, &self.synonyms.date, &posted)
            .or_else(|| find_header(&table.headers, &self.synonyms.date, &[]));
        let mut amount = find_header(&table.headers, &self.synonyms.amount, &[]);
        let mut description = find_header(&table.headers, &self.synonyms.description, &[]);

        if date.is_none() {
            date = (0..table.headers.len()).find(|&col| looks_like_dates(table, col));
        }

        if amount.is_none() {
            amount = (0..table.headers.len())
                .filter(|&col| Some(col) != date)
                .find(|&col| looks_numeric(table, col));
        }

        if description.is_none() {
            description = (0..table.headers.len()).find(|&col| Some(col) != date && Some(col) != amount);
        }

        DetectedColumns {
            date,
            description,
            amount,
        }
    }
}

/// First header (left to right) that equals one of `synonyms`, ignoring case
/// and surrounding whitespace. Columns in `exclude` are skipped.
pub fn find_header(headers: &[String], synonyms: &[String], exclude: &[usize]) -> Option<usize> {
    headers.iter().enumerate().find_map(|(idx, header)| {
        let header = header.trim().to_lowercase();
        let matched = !exclude.contains(&idx) && synonyms.iter().any(|s| *s == header);
        matched.then_some(idx)
    })
}

/// The first few non-empty values all parse as dates
fn looks_like_dates(table: &Table, column: usize) -> bool {
    let sample: Vec<&str> = table
        .non_empty_values(column)
        .take(DATE_SAMPLE_SIZE)
        .collect();
    !sample.is_empty() && sample.iter().all(|v| normalize_date(v).is_ok())
}

/// Every non-empty value parses as an amount
fn looks_numeric(table: &Table, column: usize) -> bool {
    let mut values = table.non_empty_values(column).peekable();
    values.peek().is_some() && values.all(|v| normalize_amount(v).is_ok())
}
