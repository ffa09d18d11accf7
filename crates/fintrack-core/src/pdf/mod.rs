//! PDF statement parsing
//!
//! Three stages over a "Spending Report" style statement:
//! - `extract` - page text, with OCR for pages that have no text layer
//! - `sections` - split the text under category headings
//! - `lines` - transaction lines and wrapped descriptions

pub mod extract;
pub mod lines;
pub mod ocr;
pub mod sections;

use std::sync::Arc;

use tracing::debug;

use crate::config::IngestConfig;
use crate::error::Result;
use crate::models::{IngestionError, TransactionCandidate};

pub use extract::OcrFallback;
pub use ocr::{OcrEngine, PageRasterizer, PdftoppmRasterizer, TesseractOcr, OCR_DPI};
pub use sections::{split_sections, Section};

/// Candidates plus the statement lines that could not be turned into one
#[derive(Debug, Default)]
pub struct PdfIngestion {
    pub candidates: Vec<TransactionCandidate>,
    pub errors: Vec<IngestionError>,
}

/// Parses statement PDFs into transaction candidates
pub struct PdfStatementParser {
    config: Arc<IngestConfig>,
    ocr: Option<(Arc<dyn PageRasterizer>, Arc<dyn OcrEngine>)>,
}

impl PdfStatementParser {
    /// Parser without OCR; blank pages stay blank
    pub fn new(config: Arc<IngestConfig>) -> Self {
        Self { config, ocr: None }
    }

    /// Use `pdftoppm` + `tesseract` for blank pages
    pub fn with_default_ocr(self) -> Self {
        self.with_ocr(
            Arc::new(PdftoppmRasterizer::new()),
            Arc::new(TesseractOcr::new()),
        )
    }

    pub fn with_ocr(mut self, rasterizer: Arc<dyn PageRasterizer>, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some((rasterizer, engine));
        self
    }

    /// Parse a PDF document. `ocr_fallback` enables OCR of blank pages when
    /// an engine is configured.
    pub async fn parse(&self, pdf: &[u8], ocr_fallback: bool) -> Result<PdfIngestion> {
        let ocr = match (&self.ocr, ocr_fallback) {
            (Some((rasterizer, engine)), true) => Some(OcrFallback {
                rasterizer: rasterizer.as_ref(),
                engine: engine.as_ref(),
            }),
            _ => None,
        };

        let text = extract::extract_text(pdf, ocr).await?;
        Ok(self.parse_text(&text))
    }

    /// Parse already-extracted statement text
    pub fn parse_text(&self, text: &str) -> PdfIngestion {
        let sections = split_sections(text, &self.config.pdf);
        let parsed = lines::parse_sections(&sections, &self.config);
        debug!(
            sections = sections.len(),
            candidates = parsed.candidates.len(),
            errors = parsed.errors.len(),
            "Parsed PDF statement text"
        );
        parsed
    }
}
