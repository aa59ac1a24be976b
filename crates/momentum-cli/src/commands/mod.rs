pub mod config;
pub mod log;
pub mod session;

use momentum_core::{Database, Tracker};

/// kv key holding the day that was logged but not yet advanced past.
const OPEN_DAY_KEY: &str = "open_day";

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the tracker, keeping the last day open if it was never advanced.
pub fn open_tracker() -> Result<Tracker<Database>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let open_day = db
        .kv_get(OPEN_DAY_KEY)?
        .and_then(|v| v.parse::<u32>().ok());

    let Some(open_day) = open_day else {
        return Ok(Tracker::open(db)?);
    };

    let tracker = Tracker::open_resuming(db)?;
    if tracker.engine().today().map(|e| e.day) == Some(open_day) {
        Ok(tracker)
    } else {
        tracing::debug!(open_day, "stale open day marker ignored");
        Ok(Tracker::open(tracker.into_store())?)
    }
}

/// Record whether the current day has an entry that may still be re-logged.
pub fn save_open_day(tracker: &Tracker<Database>) -> CliResult {
    let db = tracker.store();
    match tracker.engine().today() {
        Some(entry) => db.kv_set(OPEN_DAY_KEY, &entry.day.to_string())?,
        None => db.kv_delete(OPEN_DAY_KEY)?,
    }
    Ok(())
}
