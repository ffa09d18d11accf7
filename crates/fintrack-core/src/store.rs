//! Ledger storage seam
//!
//! Implemented by [`crate::db::Database`] (SQLite) and [`MemoryLedger`].
//! Implementations must make `insert` atomic with respect to the natural key:
//! of any number of concurrent inserts of the same key, exactly one reports
//! [`InsertOutcome::Inserted`].

use std::collections::HashMap;
use std::sync::Mutex;

use crate::dedup::NaturalKey;
use crate::error::{Error, Result};
use crate::models::LedgerRecord;

/// Result of a conflict-aware insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// New row id
    Inserted(i64),
    /// A record with the same natural key already existed
    Duplicate,
}

pub trait LedgerStore: Send + Sync {
    /// Whether a record with `key` exists in `scope`
    fn exists(&self, scope: &str, key: &NaturalKey) -> Result<bool>;

    /// Insert unless the record's natural key already exists in its scope
    fn insert(&self, record: &LedgerRecord) -> Result<InsertOutcome>;
}

#[derive(Debug, Default)]
struct MemoryState {
    ids_by_key: HashMap<String, i64>,
    records: Vec<LedgerRecord>,
}

/// In-process ledger for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<MemoryState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of stored records in insertion order
    pub fn records(&self) -> Result<Vec<LedgerRecord>> {
        Ok(self.lock()?.records.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::Store("memory ledger lock poisoned".to_string()))
    }
}

impl LedgerStore for MemoryLedger {
    fn exists(&self, scope: &str, key: &NaturalKey) -> Result<bool> {
        Ok(self.lock()?.ids_by_key.contains_key(&key.hash(scope)))
    }

    fn insert(&self, record: &LedgerRecord) -> Result<InsertOutcome> {
        let hash = NaturalKey::from_record(record).hash(&record.scope);
        let mut state = self.lock()?;
        if state.ids_by_key.contains_key(&hash) {
            return Ok(InsertOutcome::Duplicate);
        }

        state.records.push(record.clone());
        let id = state.records.len() as i64;
        state.ids_by_key.insert(hash, id);
        Ok(InsertOutcome::Inserted(id))
    }
}
