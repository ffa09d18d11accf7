//! Duplicate detection by natural key
//!
//! Two rows are the same transaction when date, description and amount (at
//! 2 decimal places) are all equal within one scope. The check here is
//! advisory; the store's insert is the authority under concurrency.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::{LedgerRecord, TransactionCandidate};
use crate::normalize::to_storage_scale;
use crate::store::LedgerStore;

/// Field separator for hashing, so ("ab", "c") and ("a", "bc") differ
const SEPARATOR: &[u8] = b"\x1f";

/// `(date, description, amount)` identity of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    /// Transaction date, else posted date
    pub date: Option<NaiveDate>,
    pub description: String,
    /// Scaled to 2 decimal places
    pub amount: Decimal,
}

impl NaturalKey {
    pub fn new(date: Option<NaiveDate>, description: &str, amount: Decimal) -> Self {
        Self {
            date,
            description: description.to_string(),
            amount: to_storage_scale(amount),
        }
    }

    pub fn from_candidate(candidate: &TransactionCandidate) -> Self {
        Self::new(
            candidate.transaction_date.or(candidate.posted_date),
            &candidate.description,
            candidate.amount,
        )
    }

    pub fn from_record(record: &LedgerRecord) -> Self {
        Self::new(
            record.transaction_date.or(record.posted_date),
            &record.description,
            record.amount,
        )
    }

    /// Stable SHA-256 of the key within `scope`, hex encoded
    pub fn hash(&self, scope: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(scope.as_bytes());
        hasher.update(SEPARATOR);
        if let Some(date) = self.date {
            hasher.update(date.to_string().as_bytes());
        }
        hasher.update(SEPARATOR);
        hasher.update(self.description.as_bytes());
        hasher.update(SEPARATOR);
        hasher.update(self.amount.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Looks up candidates in a ledger by natural key
pub struct Deduplicator;

impl Deduplicator {
    pub fn is_duplicate(
        candidate: &TransactionCandidate,
        store: &dyn LedgerStore,
        scope: &str,
    ) -> Result<bool> {
        store.exists(scope, &NaturalKey::from_candidate(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SourcePosition;
    use crate::store::MemoryLedger;
    use rust_decimal_macros::dec;

    fn candidate(date: Option<NaiveDate>, posted: Option<NaiveDate>, amount: Decimal) -> TransactionCandidate {
        TransactionCandidate {
            transaction_date: date,
            posted_date: posted,
            description: "NETFLIX.COM".to_string(),
            category: None,
            kind: "expense".to_string(),
            amount,
            memo: None,
            raw_source: String::new(),
            position: SourcePosition::Row(0),
        }
    }

    #[test]
    fn test_key_normalizes_amount_scale() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 14);
        let a = NaturalKey::from_candidate(&candidate(date, None, dec!(15.5)));
        let b = NaturalKey::from_candidate(&candidate(date, None, dec!(15.50)));
        assert_eq!(a, b);
        assert_eq!(a.hash("ledger"), b.hash("ledger"));
        assert_eq!(a.amount.to_string(), "15.50");
    }

    #[test]
    fn test_key_falls_back_to_posted_date() {
        let posted = NaiveDate::from_ymd_opt(2025, 2, 15);
        let key = NaturalKey::from_candidate(&candidate(None, posted, dec!(1)));
        assert_eq!(key.date, posted);
    }

    #[test]
    fn test_hash_depends_on_every_field() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 14);
        let base = NaturalKey::new(date, "ab", dec!(1.00));
        let hashes = [
            base.hash("s"),
            base.hash("t"),
            NaturalKey::new(None, "ab", dec!(1.00)).hash("s"),
            NaturalKey::new(date, "abc", dec!(1.00)).hash("s"),
            NaturalKey::new(date, "ab", dec!(-1.00)).hash("s"),
        ];
        for (i, a) in hashes.iter().enumerate() {
            for b in &hashes[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(base.hash("s").len(), 64);
    }

    #[test]
    fn test_is_duplicate() {
        let store = MemoryLedger::new();
        let date = NaiveDate::from_ymd_opt(2025, 2, 14);
        let c = candidate(date, date, dec!(-15.49));

        assert!(!Deduplicator::is_duplicate(&c, &store, "ledger").unwrap());

        let record = crate::pipeline::to_ledger_record(&c, "ledger", None, crate::models::SourceKind::Csv);
        store.insert(&record).unwrap();

        assert!(Deduplicator::is_duplicate(&c, &store, "ledger").unwrap());
        assert!(!Deduplicator::is_duplicate(&c, &store, "other").unwrap());
    }
}
