//! End-to-end ingestion of one statement file into a ledger
//!
//! Parse (CSV or PDF) → deduplicate → insert, in document order. Row and
//! candidate failures are itemized in the report; only structural failures
//! (unreadable input, missing columns, lost store connection) abort the run.

use std::sync::Arc;

use tracing::{debug, info};

use crate::classify::KeywordClassifier;
use crate::config::IngestConfig;
use crate::csv_ingest::CsvIngestor;
use crate::dedup::Deduplicator;
use crate::error::Result;
use crate::models::{
    CategorySource, IngestionError, IngestionReport, LedgerRecord, SourceKind,
    TransactionCandidate,
};
use crate::normalize::to_storage_scale;
use crate::pdf::{OcrEngine, PageRasterizer, PdfStatementParser};
use crate::store::{InsertOutcome, LedgerStore};

pub struct IngestionPipeline {
    store: Arc<dyn LedgerStore>,
    config: Arc<IngestConfig>,
    classifier: KeywordClassifier,
    pdf: PdfStatementParser,
    ocr_fallback: bool,
}

impl IngestionPipeline {
    /// Pipeline without OCR
    pub fn new(store: Arc<dyn LedgerStore>, config: Arc<IngestConfig>) -> Self {
        Self {
            store,
            classifier: KeywordClassifier::new(&config.classifier_rules),
            pdf: PdfStatementParser::new(Arc::clone(&config)),
            config,
            ocr_fallback: true,
        }
    }

    /// OCR blank PDF pages with `pdftoppm` + `tesseract`
    pub fn with_default_ocr(mut self) -> Self {
        self.pdf = self.pdf.with_default_ocr();
        self
    }

    pub fn with_ocr(mut self, rasterizer: Arc<dyn PageRasterizer>, engine: Arc<dyn OcrEngine>) -> Self {
        self.pdf = self.pdf.with_ocr(rasterizer, engine);
        self
    }

    /// Toggle OCR for blank pages (on by default when an engine is set)
    pub fn with_ocr_fallback(mut self, enabled: bool) -> Self {
        self.ocr_fallback = enabled;
        self
    }

    /// Ingest one document into `scope`
    pub async fn run(&self, bytes: &[u8], kind: SourceKind, scope: &str) -> Result<IngestionReport> {
        info!(%kind, scope, size = bytes.len(), "Starting ingestion");

        let (candidates, parse_errors) = match kind {
            SourceKind::Csv => {
                let ingestion = CsvIngestor::new(&self.config).ingest(bytes)?;
                (ingestion.candidates, ingestion.errors)
            }
            SourceKind::Pdf => {
                let parsed = self.pdf.parse(bytes, self.ocr_fallback).await?;
                (parsed.candidates, parsed.errors)
            }
        };

        let mut report = IngestionReport::default();
        for error in parse_errors {
            report.push_error(error);
        }

        for candidate in &candidates {
            self.ingest_candidate(candidate, kind, scope, &mut report)?;
        }

        info!(
            accepted = report.accepted_count,
            duplicates = report.duplicate_count,
            errors = report.error_count,
            "Ingestion complete"
        );

        Ok(report)
    }

    /// Dedup and store one candidate. Only a lost store connection is returned
    /// as an error; anything else is itemized in the report.
    fn ingest_candidate(
        &self,
        candidate: &TransactionCandidate,
        kind: SourceKind,
        scope: &str,
        report: &mut IngestionReport,
    ) -> Result<()> {
        match Deduplicator::is_duplicate(candidate, self.store.as_ref(), scope) {
            Ok(true) => {
                debug!(description = %candidate.description, "Skipping duplicate");
                report.duplicate_count += 1;
                return Ok(());
            }
            Ok(false) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                report.push_error(IngestionError::at(candidate.position, e.to_string()));
                return Ok(());
            }
        }

        let record = to_ledger_record(candidate, scope, Some(&self.classifier), kind);
        match self.store.insert(&record) {
            Ok(InsertOutcome::Inserted(_)) => report.accepted_count += 1,
            // Another run stored the same key between our check and insert
            Ok(InsertOutcome::Duplicate) => report.duplicate_count += 1,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => report.push_error(IngestionError::at(candidate.position, e.to_string())),
        }
        Ok(())
    }
}

/// Build the persisted record for a candidate.
///
/// The statement's category wins; otherwise the classifier may assign one.
pub fn to_ledger_record(
    candidate: &TransactionCandidate,
    scope: &str,
    classifier: Option<&KeywordClassifier>,
    source_kind: SourceKind,
) -> LedgerRecord {
    let (category, category_source) = match &candidate.category {
        Some(category) => (Some(category.clone()), Some(CategorySource::Statement)),
        None => match classifier.and_then(|c| c.classify(&candidate.description)) {
            Some(category) => (Some(category.to_string()), Some(CategorySource::Rule)),
            None => (None, None),
        },
    };

    LedgerRecord {
        scope: scope.to_string(),
        transaction_date: candidate.transaction_date,
        posted_date: candidate.posted_date,
        description: candidate.description.clone(),
        category,
        category_source,
        kind: candidate.kind.clone(),
        amount: to_storage_scale(candidate.amount),
        memo: candidate.memo.clone(),
        raw_source: candidate.raw_source.clone(),
        source_kind,
    }
}
