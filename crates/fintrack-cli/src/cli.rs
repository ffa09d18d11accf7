//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// fintrack - Bring bank statements into one ledger
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Bank statement ingestion into a local ledger", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "fintrack.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Ingestion config override (defaults to the data dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import a CSV or PDF statement
    Import {
        /// Statement file to import
        #[arg(short, long)]
        file: PathBuf,

        /// File format: csv or pdf (inferred from the extension if not specified)
        #[arg(long)]
        format: Option<String>,

        /// Ledger scope the transactions belong to
        #[arg(short, long, default_value = "default")]
        scope: String,

        /// Don't OCR PDF pages that have no text layer
        #[arg(long)]
        no_ocr: bool,

        /// Print the ingestion report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored transactions
    Transactions {
        /// Only this scope
        #[arg(short, long)]
        scope: Option<String>,

        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show past imports
    History {
        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show the effective ingestion configuration
    Config,
}
