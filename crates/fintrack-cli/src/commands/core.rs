//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Shared utility to resolve the ingestion config
//! - `cmd_init` - Initialize the database
//! - `cmd_config` - Show the effective ingestion config

use std::path::Path;

use anyhow::{Context, Result};
use fintrack_core::config::default_config_path;
use fintrack_core::{db::Database, IngestConfig};

/// Open (and migrate) the database
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    Database::new(path_str).context("Failed to open database")
}

/// Explicit override, else the data dir override, else built-in defaults
pub fn load_config(config_path: Option<&Path>) -> Result<IngestConfig> {
    match config_path {
        Some(path) => IngestConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => IngestConfig::load().context("Failed to load config"),
    }
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import a statement: fintrack import --file statement.csv");
    println!("  2. Review it: fintrack transactions");

    Ok(())
}

pub fn cmd_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    let source = config_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .filter(|p| p.exists());

    println!();
    println!("⚙️  Ingestion Configuration");
    println!("   ─────────────────────────────");
    match source {
        Some(path) => println!("   Source: {}", path.display()),
        None => println!("   Source: built-in defaults"),
    }
    println!(
        "   Column synonyms: {} date, {} description, {} amount",
        config.columns.date.len(),
        config.columns.description.len(),
        config.columns.amount.len()
    );
    println!(
        "   PDF section labels: {}",
        config.pdf.known_categories.join(", ")
    );
    println!(
        "   PDF amounts are outflows: {}",
        config.pdf.amounts_are_outflows
    );
    println!("   Description limit: {} chars", config.ledger.description_max_chars);
    println!("   Classifier rules: {}", config.classifier_rules.len());

    Ok(())
}
