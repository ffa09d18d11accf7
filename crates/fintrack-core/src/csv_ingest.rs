//! CSV statement ingestion
//!
//! Works on any bank export: columns are found by [`ColumnDetector`] rather
//! than a per-bank layout. Row-level failures are collected and skipped so
//! one bad row never sinks the batch.

use std::borrow::Cow;

use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::{Encoding, WINDOWS_1252};
use serde_json::{json, Value};
use tracing::debug;

use crate::columns::{find_header, ColumnDetector, Table};
use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::models::{IngestionError, SourcePosition, TransactionCandidate};
use crate::normalize::{cap_description, normalize_amount, normalize_date};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Output of one CSV ingestion: the good rows plus itemized bad ones
#[derive(Debug, Clone, Default)]
pub struct CsvIngestion {
    pub candidates: Vec<TransactionCandidate>,
    pub errors: Vec<IngestionError>,
}

/// Column indices for the optional fields
#[derive(Debug, Clone, Copy)]
struct OptionalColumns {
    posted_date: Option<usize>,
    category: Option<usize>,
    kind: Option<usize>,
    memo: Option<usize>,
}

pub struct CsvIngestor<'a> {
    config: &'a IngestConfig,
}

impl<'a> CsvIngestor<'a> {
    pub fn new(config: &'a IngestConfig) -> Self {
        Self { config }
    }

    /// Parse raw CSV bytes into candidates in row order
    pub fn ingest(&self, bytes: &[u8]) -> Result<CsvIngestion> {
        self.ingest_with_encoding(bytes, None)
    }

    /// Like [`ingest`](Self::ingest), decoding with a WHATWG encoding label
    /// (`"utf-16le"`, `"latin1"`, ...). Unknown labels fall back to detection.
    pub fn ingest_with_encoding(&self, bytes: &[u8], hint: Option<&str>) -> Result<CsvIngestion> {
        let text = match hint.and_then(|label| Encoding::for_label(label.as_bytes())) {
            Some(encoding) => encoding.decode_with_bom_removal(bytes).0,
            None => decode(bytes),
        };

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let headers = rdr.headers()?.clone();
        if headers.is_empty() || headers.iter().all(str::is_empty) {
            return Err(Error::Schema("CSV has no header row".to_string()));
        }

        let records: Vec<csv::Result<StringRecord>> = rdr.records().collect();

        let table = Table::new(
            headers.iter().map(str::to_string).collect(),
            records
                .iter()
                .filter_map(|r| r.as_ref().ok())
                .map(|r| r.iter().map(str::to_string).collect())
                .collect(),
        );

        let detected = ColumnDetector::new(&self.config.columns).detect(&table);
        let date_col = detected
            .date
            .ok_or_else(|| Error::Schema("Could not find a date column".to_string()))?;
        let amount_col = detected
            .amount
            .ok_or_else(|| Error::Schema("Could not find an amount column".to_string()))?;

        let roles: Vec<usize> = [Some(date_col), Some(amount_col), detected.description]
            .into_iter()
            .flatten()
            .collect();
        let synonyms = &self.config.columns;
        let optional = OptionalColumns {
            posted_date: find_header(&table.headers, &synonyms.posted_date, &roles),
            category: find_header(&table.headers, &synonyms.category, &roles),
            kind: find_header(&table.headers, &synonyms.kind, &roles),
            memo: find_header(&table.headers, &synonyms.memo, &roles),
        };

        debug!(
            date = date_col,
            amount = amount_col,
            description = ?detected.description,
            posted_date = ?optional.posted_date,
            "Detected CSV columns"
        );

        let mut ingestion = CsvIngestion::default();

        for (row_index, result) in records.into_iter().enumerate() {
            let position = SourcePosition::Row(row_index);
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    ingestion
                        .errors
                        .push(IngestionError::at(position, format!("Malformed row: {}", e)));
                    continue;
                }
            };

            if record.iter().all(str::is_empty) {
                debug!(row_index, "Skipping blank CSV row");
                continue;
            }

            match self.build_candidate(
                &headers,
                &record,
                position,
                date_col,
                amount_col,
                detected.description,
                optional,
            ) {
                Ok(candidate) => ingestion.candidates.push(candidate),
                Err(e) => ingestion
                    .errors
                    .push(IngestionError::at(position, e.to_string())),
            }
        }

        debug!(
            candidates = ingestion.candidates.len(),
            errors = ingestion.errors.len(),
            "Parsed CSV rows"
        );

        Ok(ingestion)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_candidate(
        &self,
        headers: &StringRecord,
        record: &StringRecord,
        position: SourcePosition,
        date_col: usize,
        amount_col: usize,
        description_col: Option<usize>,
        optional: OptionalColumns,
    ) -> Result<TransactionCandidate> {
        let transaction_date = normalize_date(field(record, date_col).unwrap_or(""))?;
        let amount = normalize_amount(field(record, amount_col).unwrap_or(""))?;

        let posted_date = optional
            .posted_date
            .and_then(|col| field(record, col))
            .and_then(|value| normalize_date(value).ok())
            .unwrap_or(transaction_date);

        let description = description_col
            .and_then(|col| field(record, col))
            .unwrap_or("");

        let kind = optional
            .kind
            .and_then(|col| field(record, col))
            .map(str::to_string)
            .unwrap_or_else(|| self.config.ledger.default_kind.clone());

        Ok(TransactionCandidate {
            transaction_date: Some(transaction_date),
            posted_date: Some(posted_date),
            description: cap_description(description, self.config.ledger.description_max_chars),
            category: optional
                .category
                .and_then(|col| field(record, col))
                .map(str::to_string),
            kind,
            amount,
            memo: optional
                .memo
                .and_then(|col| field(record, col))
                .map(str::to_string),
            raw_source: record_to_json(headers, record),
            position,
        })
    }
}

/// Non-empty field at `col`
fn field(record: &StringRecord, col: usize) -> Option<&str> {
    record.get(col).filter(|value| !value.is_empty())
}

/// Convert a CSV record to a JSON object using headers as keys
fn record_to_json(headers: &StringRecord, record: &StringRecord) -> String {
    let mut map = serde_json::Map::new();
    for (i, header) in headers.iter().enumerate() {
        if let Some(value) = record.get(i) {
            map.insert(header.to_string(), Value::String(value.to_string()));
        }
    }
    json!(map).to_string()
}

/// UTF-8 (BOM stripped), else Windows-1252 for legacy spreadsheet exports
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("CSV is not valid UTF-8, decoding as Windows-1252");
            WINDOWS_1252.decode_without_bom_handling(bytes).0
        }
    }
}
