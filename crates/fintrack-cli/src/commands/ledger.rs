//! Ledger and import history command implementations

use anyhow::Result;
use fintrack_core::db::Database;
use rust_decimal::Decimal;

use super::truncate;

fn format_amount(amount: Decimal) -> String {
    if amount.is_sign_negative() {
        format!("\x1b[31m${:.2}\x1b[0m", amount.abs()) // Red for outflows
    } else {
        format!("\x1b[32m+${:.2}\x1b[0m", amount) // Green for inflows
    }
}

pub fn cmd_transactions_list(db: &Database, scope: Option<&str>, limit: i64) -> Result<()> {
    let transactions = db.list_transactions(scope, limit, 0)?;

    if transactions.is_empty() {
        println!("No transactions found. Import some with:");
        println!("  fintrack import --file statement.csv");
        return Ok(());
    }

    let total = db.count_transactions(scope)?;

    println!();
    println!("📝 Recent Transactions ({} total)", total);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let date = tx
            .record
            .transaction_date
            .or(tx.record.posted_date)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "----------".to_string());

        println!(
            "   {} │ {:>20} │ {:<40} │ {}",
            date,
            format_amount(tx.record.amount),
            truncate(&tx.record.description, 40),
            tx.record.category.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

pub fn cmd_history(db: &Database, limit: i64) -> Result<()> {
    let sessions = db.list_import_sessions(limit)?;

    if sessions.is_empty() {
        println!("No imports yet.");
        return Ok(());
    }

    println!();
    println!("📚 Import History");
    println!("   ─────────────────────────────────────────────────────────────");

    for session in sessions {
        println!(
            "   #{:<4} {} │ {:<3} │ {:<24} │ {} imported, {} duplicates, {} failed",
            session.id,
            session.created_at.format("%Y-%m-%d %H:%M"),
            session.source_kind,
            truncate(session.filename.as_deref().unwrap_or("-"), 24),
            session.accepted_count,
            session.duplicate_count,
            session.error_count
        );
    }

    Ok(())
}
