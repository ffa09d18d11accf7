//! Import history operations

use std::str::FromStr;

use rusqlite::{params, OptionalExtension, Row};

use super::{conversion_error, parse_datetime, Database};
use crate::error::Result;
use crate::models::{ImportSession, IngestionReport, NewImportSession, SourceKind};

const SELECT_COLUMNS: &str = r#"
    SELECT id, scope, filename, file_size_bytes, source_kind,
           accepted_count, duplicate_count, error_count, created_at
    FROM import_sessions
"#;

impl Database {
    /// Create a new import session
    pub fn create_import_session(&self, session: &NewImportSession) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO import_sessions (scope, filename, file_size_bytes, source_kind)
            VALUES (?, ?, ?, ?)
            "#,
            params![
                session.scope,
                session.filename,
                session.file_size_bytes,
                session.source_kind.as_str(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Update import session with final results
    pub fn update_import_session_results(
        &self,
        session_id: i64,
        report: &IngestionReport,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            UPDATE import_sessions SET
                accepted_count = ?,
                duplicate_count = ?,
                error_count = ?
            WHERE id = ?
            "#,
            params![
                report.accepted_count as i64,
                report.duplicate_count as i64,
                report.error_count as i64,
                session_id,
            ],
        )?;
        Ok(())
    }

    /// Get a single import session by ID
    pub fn get_import_session(&self, id: i64) -> Result<Option<ImportSession>> {
        let conn = self.conn()?;
        let sql = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let session = conn
            .query_row(&sql, params![id], Self::map_import_session_row)
            .optional()?;
        Ok(session)
    }

    /// List import sessions, most recent first
    pub fn list_import_sessions(&self, limit: i64) -> Result<Vec<ImportSession>> {
        let conn = self.conn()?;
        let sql = format!("{} ORDER BY created_at DESC, id DESC LIMIT ?", SELECT_COLUMNS);

        let mut stmt = conn.prepare(&sql)?;
        let sessions = stmt
            .query_map(params![limit], Self::map_import_session_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    fn map_import_session_row(row: &Row) -> rusqlite::Result<ImportSession> {
        let source_kind: String = row.get(4)?;
        let created_at: String = row.get(8)?;

        Ok(ImportSession {
            id: row.get(0)?,
            scope: row.get(1)?,
            filename: row.get(2)?,
            file_size_bytes: row.get(3)?,
            source_kind: SourceKind::from_str(&source_kind).map_err(|e| conversion_error(4, e))?,
            accepted_count: row.get(5)?,
            duplicate_count: row.get(6)?,
            error_count: row.get(7)?,
            created_at: parse_datetime(&created_at),
        })
    }
}
