//! Statement import command

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use fintrack_core::models::{NewImportSession, SourceKind};
use fintrack_core::IngestionPipeline;
use tracing::debug;

use super::{load_config, open_db};

pub async fn cmd_import(
    db_path: &Path,
    config_path: Option<&Path>,
    file: &Path,
    format: Option<&str>,
    scope: &str,
    no_ocr: bool,
    json: bool,
) -> Result<()> {
    let kind: SourceKind = match format {
        Some(format) => format.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => SourceKind::from_path(file).ok_or_else(|| {
            anyhow::anyhow!(
                "Could not infer the format of {}.\n\
                 Specify --format with one of: csv, pdf",
                file.display()
            )
        })?,
    };

    let bytes =
        std::fs::read(file).with_context(|| format!("Failed to read file: {}", file.display()))?;

    let config = load_config(config_path)?;
    let db = open_db(db_path)?;

    if !json {
        println!("📥 Importing {} statement {} into '{}'...", kind, file.display(), scope);
    }

    let pipeline = IngestionPipeline::new(Arc::new(db.clone()), Arc::new(config))
        .with_default_ocr()
        .with_ocr_fallback(!no_ocr);

    let report = pipeline
        .run(&bytes, kind, scope)
        .await
        .with_context(|| format!("Failed to import {}", file.display()))?;

    let session_id = db.create_import_session(&NewImportSession {
        scope: scope.to_string(),
        filename: file.file_name().map(|n| n.to_string_lossy().into_owned()),
        file_size_bytes: Some(bytes.len() as i64),
        source_kind: kind,
    })?;
    db.update_import_session_results(session_id, &report)?;
    debug!(session_id, "Recorded import session");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("✅ {}", report.summary());
    if !report.errors.is_empty() {
        println!();
        println!("⚠️  Rows that could not be imported:");
        for error in &report.errors {
            let location = match (error.row_index, error.line_number) {
                (Some(row), _) => format!("row {}", row),
                (None, Some(line)) => format!("line {}", line),
                (None, None) => "-".to_string(),
            };
            println!("   {:>10} │ {}", location, error.message);
        }
    }

    Ok(())
}
