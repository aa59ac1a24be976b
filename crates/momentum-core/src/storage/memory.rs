//! In-memory log store.
//!
//! Useful for embedding the engine without SQLite and for exercising the
//! rollback path: [`MemoryStore::fail_writes`] makes every write fail
//! without touching the stored rows.

use std::collections::BTreeMap;

use super::LogStore;
use crate::energy::{Changeset, DayEntry};
use crate::error::DatabaseError;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: BTreeMap<u32, DayEntry>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing rows.
    pub fn with_entries(entries: impl IntoIterator<Item = DayEntry>) -> Self {
        Self {
            rows: entries.into_iter().map(|e| (e.day, e)).collect(),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail until switched back off.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successfully applied write calls.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn rows(&self) -> Vec<DayEntry> {
        self.rows.values().cloned().collect()
    }

    fn check_writable(&self) -> Result<(), DatabaseError> {
        if self.fail_writes {
            return Err(DatabaseError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

impl LogStore for MemoryStore {
    fn load_log(&mut self) -> Result<Vec<DayEntry>, DatabaseError> {
        Ok(self.rows())
    }

    fn upsert(&mut self, entries: &[DayEntry]) -> Result<(), DatabaseError> {
        self.check_writable()?;
        for entry in entries {
            self.rows.insert(entry.day, entry.clone());
        }
        self.writes += 1;
        Ok(())
    }

    fn delete_all(&mut self) -> Result<(), DatabaseError> {
        self.check_writable()?;
        self.rows.clear();
        self.writes += 1;
        Ok(())
    }

    fn apply(&mut self, changes: &Changeset) -> Result<(), DatabaseError> {
        // Fail before any partial write.
        self.check_writable()?;
        if changes.delete_all {
            self.rows.clear();
        }
        for entry in &changes.upserts {
            self.rows.insert(entry.day, entry.clone());
        }
        self.writes += 1;
        Ok(())
    }
}
