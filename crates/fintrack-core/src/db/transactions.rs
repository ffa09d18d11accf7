//! Ledger record operations

use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{conversion_error, parse_datetime, Database};
use crate::dedup::NaturalKey;
use crate::error::Result;
use crate::models::{CategorySource, LedgerRecord, SourceKind, StoredTransaction};
use crate::normalize::to_storage_scale;
use crate::store::{InsertOutcome, LedgerStore};

const SELECT_COLUMNS: &str = r#"
    SELECT id, scope, transaction_date, posted_date, description, category,
           category_source, kind, amount, memo, raw_source, source_kind, created_at
    FROM transactions
"#;

impl Database {
    /// Whether a record with this natural key exists in `scope`
    pub fn transaction_exists(&self, scope: &str, key: &NaturalKey) -> Result<bool> {
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE natural_key_hash = ?)",
            params![key.hash(scope)],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Insert a record unless its natural key already exists
    ///
    /// The UNIQUE constraint on `natural_key_hash` makes this safe against
    /// concurrent imports of the same file.
    pub fn insert_record(&self, record: &LedgerRecord) -> Result<InsertOutcome> {
        let conn = self.conn()?;
        let hash = NaturalKey::from_record(record).hash(&record.scope);

        let inserted = conn.execute(
            r#"
            INSERT INTO transactions (scope, transaction_date, posted_date, description, category,
                                      category_source, kind, amount, memo, raw_source, source_kind,
                                      natural_key_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(natural_key_hash) DO NOTHING
            "#,
            params![
                record.scope,
                record.transaction_date.map(|d| d.to_string()),
                record.posted_date.map(|d| d.to_string()),
                record.description,
                record.category,
                record.category_source.map(|s| s.as_str()),
                record.kind,
                to_storage_scale(record.amount).to_string(),
                record.memo,
                record.raw_source,
                record.source_kind.as_str(),
                hash,
            ],
        )?;

        if inserted == 0 {
            return Ok(InsertOutcome::Duplicate);
        }
        Ok(InsertOutcome::Inserted(conn.last_insert_rowid()))
    }

    /// Get a single record by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<StoredTransaction>> {
        let conn = self.conn()?;
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let tx = conn
            .query_row(&sql, params![id], Self::map_transaction_row)
            .optional()?;
        Ok(tx)
    }

    /// List records, newest transaction date first, optionally within one scope
    pub fn list_transactions(
        &self,
        scope: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StoredTransaction>> {
        let conn = self.conn()?;
        let sql = format!(
            "{} WHERE (?1 IS NULL OR scope = ?1) \
             ORDER BY transaction_date DESC, id DESC LIMIT ?2 OFFSET ?3",
            SELECT_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let transactions = stmt
            .query_map(params![scope, limit, offset], Self::map_transaction_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Count records, optionally within one scope
    pub fn count_transactions(&self, scope: Option<&str>) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE (?1 IS NULL OR scope = ?1)",
            params![scope],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn map_transaction_row(row: &Row) -> rusqlite::Result<StoredTransaction> {
        let amount: String = row.get(8)?;
        let source_kind: String = row.get(11)?;
        let category_source: Option<String> = row.get(6)?;
        let created_at: String = row.get(12)?;

        Ok(StoredTransaction {
            id: row.get(0)?,
            record: LedgerRecord {
                scope: row.get(1)?,
                transaction_date: parse_date_column(row, 2)?,
                posted_date: parse_date_column(row, 3)?,
                description: row.get(4)?,
                category: row.get(5)?,
                category_source: category_source
                    .map(|s| CategorySource::from_str(&s).map_err(|e| conversion_error(6, e)))
                    .transpose()?,
                kind: row.get(7)?,
                amount: Decimal::from_str(&amount).map_err(|e| conversion_error(8, e))?,
                memo: row.get(9)?,
                raw_source: row.get(10)?,
                source_kind: SourceKind::from_str(&source_kind).map_err(|e| conversion_error(11, e))?,
            },
            created_at: parse_datetime(&created_at),
        })
    }
}

fn parse_date_column(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let value: Option<String> = row.get(idx)?;
    value
        .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|e| conversion_error(idx, e)))
        .transpose()
}

impl LedgerStore for Database {
    fn exists(&self, scope: &str, key: &NaturalKey) -> Result<bool> {
        self.transaction_exists(scope, key)
    }

    fn insert(&self, record: &LedgerRecord) -> Result<InsertOutcome> {
        self.insert_record(record)
    }
}
