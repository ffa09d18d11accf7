//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `transactions` - Ledger records and the [`LedgerStore`](crate::store::LedgerStore) impl
//! - `import_history` - One row per ingestion run

use std::time::Duration;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod import_history;
mod transactions;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// How long a pooled connection waits on a locked database
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Column conversion failure for row mappers
pub(crate) fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, err.into())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (creating if needed) the database at `path` and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "fintrack_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the single writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Ledger records
            -- amount is TEXT with exactly 2 decimals so it round-trips exactly
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                scope TEXT NOT NULL,
                transaction_date DATE,
                posted_date DATE,
                description TEXT NOT NULL,
                category TEXT,
                category_source TEXT,
                kind TEXT NOT NULL,
                amount TEXT NOT NULL,
                memo TEXT,
                raw_source TEXT NOT NULL,
                source_kind TEXT NOT NULL,
                natural_key_hash TEXT NOT NULL UNIQUE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_scope ON transactions(scope);
            CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(transaction_date);

            -- Ingestion runs
            CREATE TABLE IF NOT EXISTS import_sessions (
                id INTEGER PRIMARY KEY,
                scope TEXT NOT NULL,
                filename TEXT,
                file_size_bytes INTEGER,
                source_kind TEXT NOT NULL,
                accepted_count INTEGER NOT NULL DEFAULT 0,
                duplicate_count INTEGER NOT NULL DEFAULT 0,
                error_count INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;

        info!("Database migrations complete");
        Ok(())
    }
}
