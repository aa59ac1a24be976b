//! SQLite-based storage for the energy log.
//!
//! Provides persistent storage for:
//! - Day entries, keyed by day number
//! - Key-value store for caller state (e.g. the practice session timer)

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use super::migrations;
use super::{data_dir, LogStore};
use crate::energy::{Changeset, DayEntry};
use crate::error::{DatabaseError, Result};

const UPSERT_SQL: &str = "INSERT INTO day_entries
        (day, practice, minutes, energy, gain, loss, growth_factor, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
     ON CONFLICT(day) DO UPDATE SET
        practice = excluded.practice,
        minutes = excluded.minutes,
        energy = excluded.energy,
        gain = excluded.gain,
        loss = excluded.loss,
        growth_factor = excluded.growth_factor,
        updated_at = excluded.updated_at";

/// SQLite database for the energy log.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/momentum.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("momentum.db");
        Self::open_at(&path)
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn write_upserts(tx: &Transaction<'_>, entries: &[DayEntry]) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let mut stmt = tx.prepare_cached(UPSERT_SQL)?;
        for e in entries {
            stmt.execute(params![
                e.day,
                e.practice,
                e.minutes,
                e.energy,
                e.gain,
                e.loss,
                e.growth_factor,
                now,
            ])?;
        }
        Ok(())
    }
}

impl LogStore for Database {
    fn load_log(&mut self) -> Result<Vec<DayEntry>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT day, practice, minutes, energy, gain, loss, growth_factor
             FROM day_entries
             ORDER BY day",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DayEntry {
                day: row.get(0)?,
                practice: row.get(1)?,
                minutes: row.get(2)?,
                energy: row.get(3)?,
                gain: row.get(4)?,
                loss: row.get(5)?,
                growth_factor: row.get(6)?,
            })
        })?;
        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn upsert(&mut self, entries: &[DayEntry]) -> Result<(), DatabaseError> {
        let tx = self.conn.transaction()?;
        Self::write_upserts(&tx, entries)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_all(&mut self) -> Result<(), DatabaseError> {
        self.conn.execute("DELETE FROM day_entries", [])?;
        Ok(())
    }

    /// Applies the whole changeset in one transaction.
    fn apply(&mut self, changes: &Changeset) -> Result<(), DatabaseError> {
        let tx = self.conn.transaction()?;
        if changes.delete_all {
            tx.execute("DELETE FROM day_entries", [])?;
        }
        Self::write_upserts(&tx, &changes.upserts)?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_and_load() {
        let mut db = Database::open_memory().unwrap();
        let day1 = DayEntry::practice(1, 40, 1.0);
        let day2 = DayEntry::skip(2, day1.energy);
        db.upsert(&[day1.clone(), day2.clone()]).unwrap();

        let loaded = db.load_log().unwrap();
        assert_eq!(loaded, vec![day1, day2]);
    }

    #[test]
    fn upsert_replaces_by_day() {
        let mut db = Database::open_memory().unwrap();
        db.upsert(&[DayEntry::practice(1, 40, 1.0)]).unwrap();
        db.upsert(&[DayEntry::skip(1, 1.0)]).unwrap();

        let loaded = db.load_log().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded[0].practice);
        assert_eq!(loaded[0].gain, None);
    }

    #[test]
    fn apply_delete_all() {
        let mut db = Database::open_memory().unwrap();
        db.upsert(&[DayEntry::practice(1, 40, 1.0)]).unwrap();
        db.apply(&Changeset::delete_all()).unwrap();
        assert!(db.load_log().unwrap().is_empty());
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }
}
