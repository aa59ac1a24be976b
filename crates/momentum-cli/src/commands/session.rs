use chrono::{DateTime, Utc};
use clap::Subcommand;
use momentum_core::{
    round_energy, Config, Database, DayEntry, PracticeSession, SessionSnapshot, Tracker,
};

use super::{open_tracker, save_open_day, CliResult};

const SESSION_KEY: &str = "practice_session";

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start timing a practice session
    Start,
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Print the session state as JSON
    Status,
    /// Stop the session and log its minutes as today's practice
    Finish {
        /// Also close the day after logging
        #[arg(long)]
        advance: bool,
    },
    /// Discard the session without logging anything
    Cancel,
}

fn load_session(db: &Database) -> PracticeSession {
    if let Ok(Some(json)) = db.kv_get(SESSION_KEY) {
        if let Ok(session) = serde_json::from_str::<PracticeSession>(&json) {
            return session;
        }
    }
    PracticeSession::new()
}

fn save_session(db: &Database, session: &PracticeSession) -> CliResult {
    let json = serde_json::to_string(session)?;
    db.kv_set(SESSION_KEY, &json)?;
    Ok(())
}

type Step = fn(&mut PracticeSession, DateTime<Utc>) -> Option<SessionSnapshot>;

pub fn run(action: SessionAction) -> CliResult {
    let step: Step = match action {
        SessionAction::Finish { advance } => return finish(advance),
        SessionAction::Start => PracticeSession::start,
        SessionAction::Pause => PracticeSession::pause,
        SessionAction::Resume => PracticeSession::resume,
        SessionAction::Status => |session, now| Some(session.snapshot(now)),
        SessionAction::Cancel => |session, now| {
            session.reset();
            Some(session.snapshot(now))
        },
    };

    let db = Database::open()?;
    let mut session = load_session(&db);
    let Some(snapshot) = step(&mut session, Utc::now()) else {
        return Err(format!("session is {:?}; nothing to do", session.state()).into());
    };
    save_session(&db, &session)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn finish(advance: bool) -> CliResult {
    let config = Config::load_or_default();
    let mut tracker = open_tracker()?;
    let pending = load_session(tracker.store());
    let mut session = pending.clone();
    let minutes = session
        .finish(Utc::now(), config.practice.round_session_up)
        .ok_or("no practice session in progress")?;
    if minutes < config.practice.min_minutes {
        return Err(format!(
            "session lasted {minutes} minute(s), below the {} minute minimum; keep going or cancel",
            config.practice.min_minutes
        )
        .into());
    }

    let entry = log_finished(&mut tracker, &pending, &session, minutes)?;

    let current_day = if advance {
        tracker.advance_day()?
    } else {
        tracker.engine().current_day()
    };
    save_open_day(&tracker)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "logged": entry.rounded(),
            "current_day": current_day,
            "current_energy": round_energy(tracker.engine().current_energy()),
        }))?
    );
    Ok(())
}

/// Log a finished session's minutes.
///
/// The stored timer is cleared before the practice is written, so a failure
/// after logging can never count the same session twice. If the write
/// fails, `pending` is put back so the session can be finished again.
fn log_finished(
    tracker: &mut Tracker<Database>,
    pending: &PracticeSession,
    finished: &PracticeSession,
    minutes: i64,
) -> Result<DayEntry, Box<dyn std::error::Error>> {
    save_session(tracker.store(), finished)?;
    match tracker.log_practice(minutes) {
        Ok(entry) => Ok(entry),
        Err(e) => {
            if let Err(restore) = save_session(tracker.store(), pending) {
                tracing::warn!(error = %restore, "could not restore the practice session");
            }
            Err(e.into())
        }
    }
}
