//! Energy log engine.
//!
//! The engine is a plain value: an ordered log of [`DayEntry`] plus the
//! running energy and the day being logged. It performs no I/O. Every
//! mutating operation returns a [`Changeset`] that describes the rows a
//! persistence collaborator must write for the change to stick.
//!
//! ## Day lifecycle
//!
//! ```text
//! practice/skip (repeatable, replaces in place) -> advance -> next day
//! ```
//!
//! `current_day` only moves in [`EnergyEngine::advance_day`]. A day without
//! an entry is closed out as a skip when it is advanced past.

use serde::{Deserialize, Serialize};

use super::entry::DayEntry;
use super::growth::INITIAL_ENERGY;
use crate::error::{Result, ValidationError};

/// Rows a store must write to mirror one engine operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Changeset {
    /// Drop every stored row before applying `upserts`.
    pub delete_all: bool,
    /// Rows to insert or replace, keyed by `day`.
    pub upserts: Vec<DayEntry>,
}

impl Changeset {
    pub fn upsert(entries: Vec<DayEntry>) -> Self {
        Self {
            delete_all: false,
            upserts: entries,
        }
    }

    pub fn delete_all() -> Self {
        Self {
            delete_all: true,
            upserts: Vec::new(),
        }
    }

    /// Nothing to write.
    pub fn is_empty(&self) -> bool {
        !self.delete_all && self.upserts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyEngine {
    log: Vec<DayEntry>,
    current_energy: f64,
    current_day: u32,
}

impl Default for EnergyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EnergyEngine {
    /// Empty log on day 1 with the initial energy.
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            current_energy: INITIAL_ENERGY,
            current_day: 1,
        }
    }

    /// Rebuild engine state from a previously persisted log.
    ///
    /// Entries are ordered by day. The next day to log is the last day + 1
    /// and the running energy is the last entry's energy. A log whose values
    /// do not follow from each other is loaded as-is with a warning; editing
    /// the reported day re-derives everything after it.
    ///
    /// # Errors
    /// Returns a validation error for day 0, duplicated days, or a last day
    /// with no successor.
    pub fn from_log(mut entries: Vec<DayEntry>) -> Result<Self> {
        entries.sort_by_key(|e| e.day);
        for (i, entry) in entries.iter().enumerate() {
            if entry.day == 0 {
                return Err(ValidationError::InvalidDay(0).into());
            }
            if i > 0 && entries[i - 1].day == entry.day {
                return Err(ValidationError::DuplicateDay(entry.day).into());
            }
        }

        let (current_day, current_energy) = match entries.last() {
            Some(last) => (next_day(last.day)?, last.energy),
            None => (1, INITIAL_ENERGY),
        };

        let engine = Self {
            log: entries,
            current_energy,
            current_day,
        };
        if let Some(day) = engine.first_inconsistent_day() {
            tracing::warn!(day, "loaded log does not follow the energy transitions");
        }
        Ok(engine)
    }

    /// Like [`EnergyEngine::from_log`], but the last logged day stays open.
    ///
    /// Use this when the caller knows the last day was never advanced past,
    /// so it can still be re-logged before moving on.
    pub fn from_log_open(entries: Vec<DayEntry>) -> Result<Self> {
        let mut engine = Self::from_log(entries)?;
        if let Some(last) = engine.log.last() {
            engine.current_day = last.day;
        }
        Ok(engine)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn log(&self) -> &[DayEntry] {
        &self.log
    }

    pub fn current_energy(&self) -> f64 {
        self.current_energy
    }

    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    pub fn entry(&self, day: u32) -> Option<&DayEntry> {
        self.position(day).map(|i| &self.log[i])
    }

    /// Entry for the day currently being logged, if one was recorded yet.
    pub fn today(&self) -> Option<&DayEntry> {
        self.log.last().filter(|e| e.day == self.current_day)
    }

    /// Energy the current day starts from: the last entry before it, or 1.0.
    pub fn start_of_day_energy(&self) -> f64 {
        self.log
            .iter()
            .rev()
            .find(|e| e.day < self.current_day)
            .map(|e| e.energy)
            .unwrap_or(INITIAL_ENERGY)
    }

    /// First day whose stored energy does not follow from its predecessor.
    ///
    /// `None` means the whole log satisfies the transition rules.
    pub fn first_inconsistent_day(&self) -> Option<u32> {
        let mut start = INITIAL_ENERGY;
        for entry in &self.log {
            if entry.rederive(start) != *entry {
                return Some(entry.day);
            }
            start = entry.energy;
        }
        None
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Record practice for the current day.
    ///
    /// Re-logging the same day before advancing replaces its entry; the
    /// new entry is derived from the start-of-day energy, not from the
    /// energy the previous attempt left behind. Returns the written entry
    /// with the changeset that persists it.
    ///
    /// # Errors
    /// Rejects negative minutes. Zero is accepted.
    pub fn log_practice(&mut self, minutes: i64) -> Result<(DayEntry, Changeset)> {
        if minutes < 0 {
            return Err(ValidationError::NegativeMinutes(minutes).into());
        }
        let entry = DayEntry::practice(self.current_day, minutes, self.start_of_day_energy());
        Ok(self.put_today(entry))
    }

    /// Record a skipped current day (10% decay).
    pub fn log_skip(&mut self) -> (DayEntry, Changeset) {
        let entry = DayEntry::skip(self.current_day, self.start_of_day_energy());
        self.put_today(entry)
    }

    /// Close the current day and move on to the next.
    ///
    /// A day with no entry is closed out as a skip.
    ///
    /// # Errors
    /// Fails without touching the log when the current day is the last
    /// representable one.
    pub fn advance_day(&mut self) -> Result<Changeset> {
        let next = next_day(self.current_day)?;
        let changes = if self.today().is_none() {
            self.log_skip().1
        } else {
            Changeset::default()
        };
        self.current_day = next;
        Ok(changes)
    }

    /// Change a past practice day's minutes and re-derive every entry from
    /// that day to the end of the log.
    ///
    /// Entries before `day` are untouched. Unchanged minutes are a no-op
    /// and return an empty changeset.
    ///
    /// # Errors
    /// Rejects negative minutes, unknown days and skip days without
    /// touching the log.
    pub fn recompute_suffix(&mut self, day: u32, new_minutes: i64) -> Result<Changeset> {
        if new_minutes < 0 {
            return Err(ValidationError::NegativeMinutes(new_minutes).into());
        }
        let idx = self
            .position(day)
            .ok_or(ValidationError::UnknownDay(day))?;
        let target = &self.log[idx];
        if !target.practice {
            return Err(ValidationError::NotPracticeDay(day).into());
        }
        if target.minutes == new_minutes {
            return Ok(Changeset::default());
        }

        let mut start = if idx == 0 {
            INITIAL_ENERGY
        } else {
            self.log[idx - 1].energy
        };

        self.log[idx] = DayEntry::practice(day, new_minutes, start);
        start = self.log[idx].energy;
        for entry in self.log[idx + 1..].iter_mut() {
            *entry = entry.rederive(start);
            start = entry.energy;
        }

        let changed = self.log.len() - idx;
        tracing::debug!(day, new_minutes, changed, "recomputed log suffix");

        self.refresh_current_energy();
        Ok(Changeset::upsert(self.log[idx..].to_vec()))
    }

    /// Clear the log and start over on day 1.
    pub fn reset(&mut self) -> Changeset {
        *self = Self::new();
        Changeset::delete_all()
    }

    fn position(&self, day: u32) -> Option<usize> {
        self.log.binary_search_by_key(&day, |e| e.day).ok()
    }

    fn put_today(&mut self, entry: DayEntry) -> (DayEntry, Changeset) {
        match self.log.last_mut() {
            Some(last) if last.day == entry.day => *last = entry.clone(),
            _ => self.log.push(entry.clone()),
        }
        self.current_energy = entry.energy;
        let changes = Changeset::upsert(vec![entry.clone()]);
        (entry, changes)
    }

    fn refresh_current_energy(&mut self) {
        self.current_energy = self
            .log
            .last()
            .map(|e| e.energy)
            .unwrap_or(INITIAL_ENERGY);
    }
}

fn next_day(day: u32) -> Result<u32> {
    day.checked_add(1).ok_or_else(|| ValidationError::InvalidDay(day).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    /// Practice `minutes` on each listed day, advancing after each.
    fn engine_with(days: &[Option<i64>]) -> EnergyEngine {
        let mut engine = EnergyEngine::new();
        for day in days {
            match day {
                Some(m) => {
                    engine.log_practice(*m).unwrap();
                }
                None => {
                    engine.log_skip();
                }
            }
            engine.advance_day().unwrap();
        }
        engine
    }

    #[test]
    fn new_engine_starts_on_day_one() {
        let engine = EnergyEngine::new();
        assert_eq!(engine.current_day(), 1);
        assert_eq!(engine.current_energy(), 1.0);
        assert!(engine.log().is_empty());
        assert!(engine.today().is_none());
    }

    #[test]
    fn practice_then_skip_scenario() {
        let mut engine = EnergyEngine::new();
        let (logged, changes) = engine.log_practice(40).unwrap();
        assert_eq!(changes.upserts, vec![logged]);

        let day1 = engine.entry(1).unwrap();
        assert!(close(day1.energy, 1.05, 0.005));
        assert!(close(day1.gain.unwrap(), 0.05, 0.005));
        assert!(close(day1.growth_factor.unwrap(), 1.0525, 0.0001));
        assert_eq!(engine.current_day(), 1);

        assert!(engine.advance_day().unwrap().is_empty());
        assert_eq!(engine.current_day(), 2);

        engine.log_skip();
        let day2 = engine.entry(2).unwrap();
        assert!(close(day2.loss.unwrap(), 0.105, 0.0005));
        assert!(close(day2.energy, 0.947, 0.0005));
        assert_eq!(day2.rounded().energy, 0.95);
        assert_eq!(engine.current_energy(), day2.energy);
    }

    #[test]
    fn relogging_same_day_replaces_in_place() {
        let mut engine = EnergyEngine::new();
        engine.log_practice(10).unwrap();
        engine.log_practice(60).unwrap();
        assert_eq!(engine.log().len(), 1);
        assert_eq!(engine.entry(1).unwrap().minutes, 60);
        assert_eq!(
            engine.entry(1).unwrap(),
            &DayEntry::practice(1, 60, 1.0)
        );
    }

    #[test]
    fn skip_after_practice_overwrites_from_start_of_day() {
        let mut engine = engine_with(&[Some(120)]);
        let start = engine.current_energy();
        engine.log_practice(60).unwrap();
        engine.log_skip();

        assert_eq!(engine.log().len(), 2);
        let today = engine.today().unwrap();
        assert!(!today.practice);
        assert_eq!(today, &DayEntry::skip(2, start));
        assert_eq!(engine.current_energy(), today.energy);
        assert_eq!(engine.first_inconsistent_day(), None);
    }

    #[test]
    fn negative_practice_is_rejected() {
        let mut engine = EnergyEngine::new();
        let err = engine.log_practice(-1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NegativeMinutes(-1))
        ));
        assert!(engine.log().is_empty());
    }

    #[test]
    fn advance_synthesizes_skip_for_empty_day() {
        let mut engine = engine_with(&[Some(40)]);
        let before = engine.current_energy();
        let changes = engine.advance_day().unwrap();

        assert_eq!(changes.upserts.len(), 1);
        let skipped = engine.entry(2).unwrap();
        assert!(!skipped.practice);
        assert_eq!(skipped, &DayEntry::skip(2, before));
        assert_eq!(engine.current_day(), 3);
    }

    #[test]
    fn ninety_days_at_forty_minutes_reaches_target() {
        let engine = engine_with(&[Some(40); 90]);
        assert!(close(engine.current_energy(), 100.0, 2.0));
    }

    #[test]
    fn thirty_days_at_two_hours_reaches_target() {
        let engine = engine_with(&[Some(120); 30]);
        assert!(close(engine.current_energy(), 100.0, 2.0));
    }

    #[test]
    fn short_daily_practice_still_compounds() {
        let engine = engine_with(&[Some(5); 90]);
        assert!(close(engine.current_energy(), 1.2938, 0.001));
    }

    #[test]
    fn small_edit_changes_every_later_day() {
        let mut engine = engine_with(&[Some(1), Some(5), Some(5), None, Some(5)]);
        let before = engine.clone();
        engine.recompute_suffix(1, 3).unwrap();
        for day in 1..=5 {
            assert!(
                engine.entry(day).unwrap().energy > before.entry(day).unwrap().energy,
                "day {day} should grow"
            );
        }
    }

    #[test]
    fn advancing_past_last_day_fails_cleanly() {
        let mut engine = EnergyEngine::from_log(vec![DayEntry::practice(u32::MAX - 1, 30, 1.0)])
            .unwrap();
        assert_eq!(engine.current_day(), u32::MAX);
        let before = engine.clone();
        let err = engine.advance_day().unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidDay(u32::MAX))
        ));
        assert_eq!(engine, before);
    }

    #[test]
    fn from_log_rejects_last_representable_day() {
        let entries = vec![DayEntry::skip(u32::MAX, 1.0)];
        let err = EnergyEngine::from_log(entries).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidDay(u32::MAX))
        ));
    }

    #[test]
    fn recompute_with_same_minutes_is_noop() {
        let mut engine = engine_with(&[Some(30), None, Some(45), Some(90)]);
        let before = engine.clone();
        let changes = engine.recompute_suffix(3, 45).unwrap();
        assert!(changes.is_empty());
        assert_eq!(engine, before);
    }

    #[test]
    fn recompute_updates_every_later_entry() {
        let mut engine = engine_with(&[Some(30), Some(30), None, Some(45), Some(90)]);
        let before = engine.clone();

        let changes = engine.recompute_suffix(2, 120).unwrap();
        assert_eq!(
            changes.upserts.iter().map(|e| e.day).collect::<Vec<_>>(),
            vec![2, 3, 4, 5]
        );

        assert_eq!(engine.entry(1), before.entry(1));
        for day in 2..=5 {
            assert_ne!(
                engine.entry(day).unwrap().energy,
                before.entry(day).unwrap().energy,
                "day {day} should change"
            );
        }
        assert_eq!(engine.entry(2).unwrap().minutes, 120);
        assert_eq!(engine.entry(4).unwrap().minutes, 45);
        assert_eq!(engine.current_energy(), engine.entry(5).unwrap().energy);
        assert_eq!(engine.current_day(), 6);
        assert_eq!(engine.first_inconsistent_day(), None);
    }

    #[test]
    fn recompute_first_day_starts_from_initial_energy() {
        let mut engine = engine_with(&[Some(10), Some(20)]);
        engine.recompute_suffix(1, 60).unwrap();
        assert_eq!(engine.entry(1).unwrap(), &DayEntry::practice(1, 60, 1.0));
    }

    #[test]
    fn recompute_unadvanced_today_keeps_current_energy_in_sync() {
        let mut engine = engine_with(&[Some(40)]);
        engine.log_practice(20).unwrap();
        engine.recompute_suffix(1, 90).unwrap();

        assert_eq!(engine.current_day(), 2);
        assert_eq!(engine.current_energy(), engine.entry(2).unwrap().energy);
        assert_eq!(engine.first_inconsistent_day(), None);
    }

    #[test]
    fn repeated_edits_match_fresh_log() {
        let mut edited = engine_with(&[Some(10), None, Some(50)]);
        edited.recompute_suffix(1, 80).unwrap();
        edited.recompute_suffix(3, 5).unwrap();
        edited.recompute_suffix(1, 25).unwrap();

        let fresh = engine_with(&[Some(25), None, Some(5)]);
        assert_eq!(edited, fresh);
    }

    #[test]
    fn editing_skip_day_is_rejected_and_leaves_log_unchanged() {
        let mut engine = engine_with(&[Some(30), None, Some(30)]);
        let before = engine.clone();
        let err = engine.recompute_suffix(2, 30).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NotPracticeDay(2))
        ));
        assert_eq!(engine, before);
    }

    #[test]
    fn editing_unknown_day_or_negative_minutes_is_rejected() {
        let mut engine = engine_with(&[Some(30)]);
        let before = engine.clone();
        assert!(engine.recompute_suffix(7, 30).unwrap_err().is_invalid_input());
        assert!(engine.recompute_suffix(1, -3).unwrap_err().is_invalid_input());
        assert_eq!(engine, before);
    }

    #[test]
    fn from_log_restores_day_and_energy() {
        let original = engine_with(&[Some(40), None, Some(60)]);
        let restored = EnergyEngine::from_log(original.log().to_vec()).unwrap();
        assert_eq!(restored.current_day(), 4);
        assert_eq!(restored.current_energy(), original.log()[2].energy);
        assert_eq!(restored, original);
    }

    #[test]
    fn from_log_sorts_and_rejects_duplicates() {
        let mut entries = engine_with(&[Some(40), Some(40)]).log().to_vec();
        entries.reverse();
        let engine = EnergyEngine::from_log(entries.clone()).unwrap();
        assert_eq!(engine.log()[0].day, 1);

        entries.push(entries[0].clone());
        let err = EnergyEngine::from_log(entries).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::DuplicateDay(2))
        ));
    }

    #[test]
    fn from_log_open_keeps_last_day_open() {
        let mut original = engine_with(&[Some(40)]);
        original.log_practice(30).unwrap();

        let mut reopened = EnergyEngine::from_log_open(original.log().to_vec()).unwrap();
        assert_eq!(reopened, original);
        reopened.log_practice(90).unwrap();
        assert_eq!(reopened.log().len(), 2);
        assert_eq!(reopened.today().unwrap().minutes, 90);
    }

    #[test]
    fn from_empty_log_defaults() {
        let engine = EnergyEngine::from_log(Vec::new()).unwrap();
        assert_eq!(engine, EnergyEngine::new());
    }

    #[test]
    fn reset_empties_log() {
        let mut engine = engine_with(&[Some(40), None]);
        let changes = engine.reset();
        assert!(changes.delete_all);
        assert_eq!(engine, EnergyEngine::new());
    }

    #[test]
    fn detects_tampered_entry() {
        let mut entries = engine_with(&[Some(40), Some(40), Some(40)]).log().to_vec();
        entries[1].energy += 1.0;
        let engine = EnergyEngine::from_log(entries).unwrap();
        assert_eq!(engine.first_inconsistent_day(), Some(2));
    }
}
