//! OCR fallback for scanned statement pages
//!
//! Pages are rasterized with poppler's `pdftoppm` and recognized with the
//! `tesseract` CLI. Both sit behind traits so tests (and other engines) can
//! stand in.

use std::process::Stdio;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Rasterization resolution for OCR
pub const OCR_DPI: u32 = 300;

/// Turns an image into text
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String>;
}

/// Renders one page (1-based) of a PDF to an image
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    async fn rasterize(&self, pdf: &[u8], page: usize, dpi: u32) -> Result<Vec<u8>>;
}

/// `tesseract` CLI reading the image from stdin
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    binary: String,
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self {
            binary: "tesseract".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: &[u8]) -> Result<String> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Ocr(format!("Failed to run {}: {}", self.binary, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(image).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ocr(format!("tesseract failed: {}", stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// poppler `pdftoppm` rendering a single page to PNG
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: String,
}

impl PdftoppmRasterizer {
    pub fn new() -> Self {
        Self {
            binary: "pdftoppm".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageRasterizer for PdftoppmRasterizer {
    async fn rasterize(&self, pdf: &[u8], page: usize, dpi: u32) -> Result<Vec<u8>> {
        let work_dir = TempDir::new()?;
        let input = work_dir.path().join("statement.pdf");
        let prefix = work_dir.path().join("page");
        tokio::fs::write(&input, pdf).await?;

        let page = page.to_string();
        let output = Command::new(&self.binary)
            .arg("-png")
            .args(["-r", &dpi.to_string()])
            .args(["-f", &page, "-l", &page])
            .arg("-singlefile")
            .arg(&input)
            .arg(&prefix)
            .output()
            .await
            .map_err(|e| Error::Ocr(format!("Failed to run {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Ocr(format!("pdftoppm failed: {}", stderr.trim())));
        }

        Ok(tokio::fs::read(prefix.with_extension("png")).await?)
    }
}
