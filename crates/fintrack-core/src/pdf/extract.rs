//! Page text extraction with per-page OCR fallback

use tracing::{debug, warn};

use super::ocr::{OcrEngine, PageRasterizer, OCR_DPI};
use crate::error::{Error, Result};

/// OCR collaborators used for pages without a text layer
pub struct OcrFallback<'a> {
    pub rasterizer: &'a dyn PageRasterizer,
    pub engine: &'a dyn OcrEngine,
}

/// Embedded text of each page, in page order
pub fn page_texts(pdf: &[u8]) -> Result<Vec<String>> {
    pdf_extract::extract_text_from_mem_by_pages(pdf)
        .map_err(|e| Error::Pdf(format!("Failed to extract text from PDF: {}", e)))
}

/// Extract the whole document as one string, pages joined by `\n`
///
/// Blank pages are sent through OCR when `ocr` is given. A page whose OCR
/// fails contributes an empty string.
pub async fn extract_text(pdf: &[u8], ocr: Option<OcrFallback<'_>>) -> Result<String> {
    let mut pages = page_texts(pdf)?;
    fill_blank_pages(pdf, &mut pages, ocr).await;
    Ok(pages.join("\n"))
}

/// Replace blank pages with OCR output
pub async fn fill_blank_pages(pdf: &[u8], pages: &mut [String], ocr: Option<OcrFallback<'_>>) {
    let Some(ocr) = ocr else {
        return;
    };

    for (idx, text) in pages.iter_mut().enumerate() {
        if !text.trim().is_empty() {
            continue;
        }

        let page = idx + 1;
        debug!(page, "Page has no text layer, running OCR");
        *text = match ocr_page(pdf, page, &ocr).await {
            Ok(recognized) => recognized,
            Err(e) => {
                warn!(page, error = %e, "OCR failed for page");
                String::new()
            }
        };
    }
}

async fn ocr_page(pdf: &[u8], page: usize, ocr: &OcrFallback<'_>) -> Result<String> {
    let image = ocr.rasterizer.rasterize(pdf, page, OCR_DPI).await?;
    ocr.engine.recognize(&image).await
}
