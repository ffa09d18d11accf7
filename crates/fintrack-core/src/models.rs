//! Domain models for fintrack

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of statement export being ingested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Pdf,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
        }
    }

    /// Infer the source kind from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "pdf" => Ok(Self::Pdf),
            _ => Err(format!("Unknown source kind: {}", s)),
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Where in the source document a candidate (or an error) came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePosition {
    /// 0-based CSV data row (header excluded)
    Row(usize),
    /// 1-based line in the concatenated PDF text
    Line(usize),
}

/// A parsed-but-not-yet-deduplicated transaction
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCandidate {
    pub transaction_date: Option<NaiveDate>,
    /// Same as `transaction_date` when the statement carries only one date
    pub posted_date: Option<NaiveDate>,
    pub description: String,
    /// PDF section label, or the raw CSV category column
    pub category: Option<String>,
    pub kind: String,
    /// Signed; negative = money out
    pub amount: Decimal,
    pub memo: Option<String>,
    /// Original row (as JSON) or line, kept for audit
    pub raw_source: String,
    pub position: SourcePosition,
}

/// How a stored record got its category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySource {
    /// Taken from the statement (CSV column or PDF section)
    Statement,
    /// Assigned by the keyword classifier
    Rule,
}

impl CategorySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Statement => "statement",
            Self::Rule => "rule",
        }
    }
}

impl std::str::FromStr for CategorySource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "statement" => Ok(Self::Statement),
            "rule" => Ok(Self::Rule),
            _ => Err(format!("Unknown category source: {}", s)),
        }
    }
}

/// The record shape handed to the ledger store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Destination table/scope the natural key is unique within
    pub scope: String,
    pub transaction_date: Option<NaiveDate>,
    pub posted_date: Option<NaiveDate>,
    pub description: String,
    pub category: Option<String>,
    pub category_source: Option<CategorySource>,
    pub kind: String,
    /// Always scaled to exactly 2 fractional digits
    pub amount: Decimal,
    pub memo: Option<String>,
    pub raw_source: String,
    pub source_kind: SourceKind,
}

/// A record as read back from the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub id: i64,
    #[serde(flatten)]
    pub record: LedgerRecord,
    pub created_at: DateTime<Utc>,
}

/// One itemized per-row/per-candidate failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
    pub message: String,
}

impl IngestionError {
    pub fn at(position: SourcePosition, message: impl Into<String>) -> Self {
        let (row_index, line_number) = match position {
            SourcePosition::Row(row) => (Some(row), None),
            SourcePosition::Line(line) => (None, Some(line)),
        };
        Self {
            row_index,
            line_number,
            message: message.into(),
        }
    }
}

/// Result of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionReport {
    pub accepted_count: usize,
    pub duplicate_count: usize,
    pub error_count: usize,
    pub errors: Vec<IngestionError>,
}

impl IngestionReport {
    pub fn push_error(&mut self, error: IngestionError) {
        self.errors.push(error);
        self.error_count = self.errors.len();
    }

    /// Human-readable one-line summary
    pub fn summary(&self) -> String {
        let mut message = format!("{} transactions imported.", self.accepted_count);
        if self.duplicate_count > 0 {
            message.push_str(&format!(" {} duplicate(s) skipped.", self.duplicate_count));
        }
        if self.error_count > 0 {
            message.push_str(&format!(" {} row(s) failed.", self.error_count));
        }
        message
    }
}

/// New import session for recording a completed run
#[derive(Debug, Clone)]
pub struct NewImportSession {
    pub scope: String,
    pub filename: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub source_kind: SourceKind,
}

/// A recorded ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSession {
    pub id: i64,
    pub scope: String,
    pub filename: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub source_kind: SourceKind,
    pub accepted_count: i64,
    pub duplicate_count: i64,
    pub error_count: i64,
    pub created_at: DateTime<Utc>,
}
