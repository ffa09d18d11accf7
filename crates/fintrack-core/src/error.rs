//! Error types for fintrack

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A single date or amount string could not be parsed (row-scoped)
    #[error("Parse error: {0}")]
    Parse(String),

    /// No usable date/amount column was found (batch-fatal)
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    /// Ledger exists/insert failed for one candidate
    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error aborts a whole ingestion run rather than one row
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Schema(_) | Self::Pdf(_) | Self::Io(_) | Self::Config(_) | Self::Pool(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
