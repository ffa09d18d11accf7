//! fintrack Core Library
//!
//! Bank statement ingestion for the fintrack ledger:
//! - Amount and date normalization for free-form statement fields
//! - Column detection and ingestion for arbitrary CSV exports
//! - Section-based PDF statement parsing with OCR fallback
//! - Natural-key deduplication over a pluggable ledger store
//! - SQLite ledger with import history
//! - Keyword rules for uncategorized transactions
//! - Layered configuration for header synonyms and section labels

pub mod classify;
pub mod columns;
pub mod config;
pub mod csv_ingest;
pub mod db;
pub mod dedup;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pdf;
pub mod pipeline;
pub mod store;

#[cfg(test)]
mod test_utils;

pub use classify::KeywordClassifier;
pub use columns::{ColumnDetector, DetectedColumns, Table};
pub use config::IngestConfig;
pub use csv_ingest::{CsvIngestion, CsvIngestor};
pub use db::Database;
pub use dedup::{Deduplicator, NaturalKey};
pub use error::{Error, Result};
pub use models::{
    IngestionError, IngestionReport, LedgerRecord, SourceKind, SourcePosition,
    StoredTransaction, TransactionCandidate,
};
pub use pdf::{OcrEngine, PageRasterizer, PdfIngestion, PdfStatementParser};
pub use pipeline::IngestionPipeline;
pub use store::{InsertOutcome, LedgerStore, MemoryLedger};
