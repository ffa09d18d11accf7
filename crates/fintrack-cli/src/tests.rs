//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::{Path, PathBuf};

use fintrack_core::db::Database;
use tempfile::TempDir;

use crate::commands::{self, truncate};

const STATEMENT_CSV: &str = "Transaction Date,Post Date,Description,Category,Type,Amount,Memo
01/15/2024,01/16/2024,NETFLIX.COM,Entertainment,Sale,-15.99,
01/14/2024,01/15/2024,STARBUCKS,Food & Drink,Sale,-5.50,
01/13/2024,01/14/2024,BROKEN ROW,Shopping,Sale,??,";

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn db_path(dir: &TempDir) -> PathBuf {
    dir.path().join("fintrack.db")
}

fn open(path: &Path) -> Database {
    Database::new(path.to_str().unwrap()).unwrap()
}

// ========== Import Command Tests ==========

#[tokio::test]
async fn test_cmd_import_csv() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "january.csv", STATEMENT_CSV);

    commands::cmd_import(&db_path(&dir), None, &file, None, "household", true, false)
        .await
        .unwrap();

    let db = open(&db_path(&dir));
    assert_eq!(db.count_transactions(Some("household")).unwrap(), 2);

    let sessions = db.list_import_sessions(10).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].filename.as_deref(), Some("january.csv"));
    assert_eq!(sessions[0].accepted_count, 2);
    assert_eq!(sessions[0].error_count, 1);
}

#[tokio::test]
async fn test_cmd_import_twice_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "january.csv", STATEMENT_CSV);

    for _ in 0..2 {
        commands::cmd_import(&db_path(&dir), None, &file, None, "household", true, true)
            .await
            .unwrap();
    }

    let db = open(&db_path(&dir));
    assert_eq!(db.count_transactions(None).unwrap(), 2);

    let sessions = db.list_import_sessions(10).unwrap();
    assert_eq!(sessions.len(), 2);
    // Most recent first
    assert_eq!(sessions[0].accepted_count, 0);
    assert_eq!(sessions[0].duplicate_count, 2);
}

#[tokio::test]
async fn test_cmd_import_explicit_format() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "export.dat", STATEMENT_CSV);

    // Unknown extension without --format fails
    let result =
        commands::cmd_import(&db_path(&dir), None, &file, None, "s", true, false).await;
    assert!(result.is_err());

    commands::cmd_import(&db_path(&dir), None, &file, Some("csv"), "s", true, false)
        .await
        .unwrap();
    assert_eq!(open(&db_path(&dir)).count_transactions(None).unwrap(), 2);

    let result =
        commands::cmd_import(&db_path(&dir), None, &file, Some("xlsx"), "s", true, false).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_cmd_import_missing_columns_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_file(&dir, "notes.csv", "Name,Notes\nalice,hello");

    let result = commands::cmd_import(&db_path(&dir), None, &file, None, "s", true, false).await;
    assert!(result.is_err());
    // Failed runs leave no history behind
    assert!(open(&db_path(&dir)).list_import_sessions(10).unwrap().is_empty());
}

#[tokio::test]
async fn test_cmd_import_with_config_override() {
    let dir = TempDir::new().unwrap();
    let config = write_file(
        &dir,
        "ingest.toml",
        "[columns]\namount = [\"betrag\"]\ndate = [\"datum\"]\ndescription = [\"text\"]\n",
    );
    let file = write_file(&dir, "konto.csv", "Datum,Text,Betrag\n01/15/2024,MIETE,-900.00");

    commands::cmd_import(&db_path(&dir), Some(&config), &file, None, "s", true, false)
        .await
        .unwrap();

    let db = open(&db_path(&dir));
    let stored = db.list_transactions(None, 10, 0).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].record.description, "MIETE");
}

#[tokio::test]
async fn test_cmd_import_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.csv");
    let result = commands::cmd_import(&db_path(&dir), None, &missing, None, "s", true, false).await;
    assert!(result.is_err());
}

// ========== Core Command Tests ==========

#[test]
fn test_cmd_init() {
    let dir = TempDir::new().unwrap();
    commands::cmd_init(&db_path(&dir)).unwrap();
    assert!(db_path(&dir).exists());
}

#[test]
fn test_cmd_config() {
    assert!(commands::cmd_config(None).is_ok());

    let dir = TempDir::new().unwrap();
    let bad = write_file(&dir, "bad.toml", "[columns\n");
    assert!(commands::cmd_config(Some(&bad)).is_err());
}

// ========== Ledger Command Tests ==========

#[tokio::test]
async fn test_cmd_transactions_and_history() {
    let dir = TempDir::new().unwrap();
    let db = open(&db_path(&dir));

    // Empty ledger
    assert!(commands::cmd_transactions_list(&db, None, 20).is_ok());
    assert!(commands::cmd_history(&db, 20).is_ok());

    let file = write_file(&dir, "january.csv", STATEMENT_CSV);
    commands::cmd_import(&db_path(&dir), None, &file, None, "household", true, true)
        .await
        .unwrap();

    assert!(commands::cmd_transactions_list(&db, Some("household"), 20).is_ok());
    assert!(commands::cmd_transactions_list(&db, Some("other"), 20).is_ok());
    assert!(commands::cmd_history(&db, 20).is_ok());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly 10", 10), "exactly 10");
    assert_eq!(truncate("this is a long description", 10), "this is...");
    assert_eq!(truncate("CAFÉ CAFÉ CAFÉ", 8), "CAFÉ ...");
}
