//! fintrack CLI - Bank statement ingestion
//!
//! Usage:
//!   fintrack init                          Initialize database
//!   fintrack import --file statement.csv   Import a CSV or PDF statement
//!   fintrack transactions --limit 20       List stored transactions
//!   fintrack history                       Show past imports

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Import {
            file,
            format,
            scope,
            no_ocr,
            json,
        } => {
            commands::cmd_import(
                &cli.db,
                cli.config.as_deref(),
                &file,
                format.as_deref(),
                &scope,
                no_ocr,
                json,
            )
            .await
        }
        Commands::Transactions { scope, limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_transactions_list(&db, scope.as_deref(), limit)
        }
        Commands::History { limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_history(&db, limit)
        }
        Commands::Config => commands::cmd_config(cli.config.as_deref()),
    }
}
