//! Persistence-aware wrapper around [`EnergyEngine`].
//!
//! Every operation runs against a copy of the engine. The copy replaces the
//! live engine only after the store has accepted the resulting changeset,
//! so a failed write leaves both the store and the in-memory state exactly
//! as they were.

use crate::energy::{Changeset, DayEntry, EnergyEngine};
use crate::error::Result;
use crate::storage::LogStore;

pub struct Tracker<S> {
    engine: EnergyEngine,
    store: S,
}

impl<S: LogStore> Tracker<S> {
    /// Load the log from `store`. The day after the last entry is the
    /// current day.
    ///
    /// # Errors
    /// Returns a persistence error if loading fails, or a validation error
    /// if the stored log is malformed.
    pub fn open(mut store: S) -> Result<Self> {
        let engine = EnergyEngine::from_log(store.load_log()?)?;
        Ok(Self { engine, store })
    }

    /// Load the log from `store`, keeping the last logged day open.
    pub fn open_resuming(mut store: S) -> Result<Self> {
        let engine = EnergyEngine::from_log_open(store.load_log()?)?;
        Ok(Self { engine, store })
    }

    pub fn engine(&self) -> &EnergyEngine {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Record practice for the current day and persist it.
    pub fn log_practice(&mut self, minutes: i64) -> Result<DayEntry> {
        self.commit("log_practice", |engine| engine.log_practice(minutes))
    }

    /// Record a skip for the current day and persist it.
    pub fn log_skip(&mut self) -> Result<DayEntry> {
        self.commit("log_skip", |engine| Ok(engine.log_skip()))
    }

    /// Close the current day, persisting a synthesized skip if it had no
    /// entry. Returns the new current day.
    pub fn advance_day(&mut self) -> Result<u32> {
        self.commit("advance_day", |engine| {
            let changes = engine.advance_day()?;
            Ok((engine.current_day(), changes))
        })
    }

    /// Change a practice day's minutes and persist every re-derived entry.
    ///
    /// Returns the rewritten entries; empty when the minutes were unchanged.
    pub fn edit_minutes(&mut self, day: u32, minutes: i64) -> Result<Vec<DayEntry>> {
        self.commit("edit_minutes", |engine| {
            let changes = engine.recompute_suffix(day, minutes)?;
            Ok((changes.upserts.clone(), changes))
        })
    }

    /// Delete the whole log and start over on day 1.
    pub fn reset(&mut self) -> Result<()> {
        self.commit("reset", |engine| Ok(((), engine.reset())))?;
        tracing::info!("energy log reset");
        Ok(())
    }

    /// Discard in-memory state and rebuild it from the store.
    pub fn reload(&mut self) -> Result<()> {
        self.engine = EnergyEngine::from_log(self.store.load_log()?)?;
        Ok(())
    }

    /// Run `f` on a copy of the engine and swap the copy in once its
    /// changeset is stored. Returns whatever `f` reported alongside it.
    fn commit<T, F>(&mut self, op: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&mut EnergyEngine) -> Result<(T, Changeset)>,
    {
        let mut next = self.engine.clone();
        let (output, changes) = f(&mut next)?;

        if !changes.is_empty() {
            if let Err(e) = self.store.apply(&changes) {
                tracing::warn!(op, error = %e, "persisting changes failed; state left unchanged");
                return Err(e.into());
            }
        }

        tracing::debug!(
            op,
            rows = changes.upserts.len(),
            delete_all = changes.delete_all,
            current_day = next.current_day(),
            "committed"
        );
        self.engine = next;
        Ok(output)
    }
}
