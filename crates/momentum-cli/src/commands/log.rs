//! Day logging commands: practice, skip, advance, edit, log, status, reset.

use momentum_core::{round_energy, Config, DayEntry, Progress, ValidationError};

use super::{open_tracker, save_open_day, CliResult};

pub fn practice(minutes: i64) -> CliResult {
    let config = Config::load_or_default();
    if minutes < config.practice.min_minutes {
        return Err(ValidationError::BelowMinimum {
            min: config.practice.min_minutes,
            got: minutes,
        }
        .into());
    }

    let mut tracker = open_tracker()?;
    let entry = tracker.log_practice(minutes)?;
    save_open_day(&tracker)?;
    println!("{}", serde_json::to_string_pretty(&entry.rounded())?);
    Ok(())
}

pub fn skip() -> CliResult {
    let mut tracker = open_tracker()?;
    let entry = tracker.log_skip()?;
    save_open_day(&tracker)?;
    println!("{}", serde_json::to_string_pretty(&entry.rounded())?);
    Ok(())
}

pub fn advance() -> CliResult {
    let mut tracker = open_tracker()?;
    let closed = tracker.engine().current_day();
    let current_day = tracker.advance_day()?;
    save_open_day(&tracker)?;

    let entry = tracker.engine().entry(closed).map(DayEntry::rounded);
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "closed": entry,
            "current_day": current_day,
            "current_energy": round_energy(tracker.engine().current_energy()),
        }))?
    );
    Ok(())
}

pub fn edit(day: u32, minutes: i64) -> CliResult {
    let mut tracker = open_tracker()?;
    let changed = tracker.edit_minutes(day, minutes)?;
    save_open_day(&tracker)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "changed": rounded(&changed),
            "current_energy": round_energy(tracker.engine().current_energy()),
        }))?
    );
    Ok(())
}

pub fn show(json: bool) -> CliResult {
    let tracker = open_tracker()?;
    let log = tracker.engine().log();
    if json || Config::load_or_default().display.json {
        println!("{}", serde_json::to_string_pretty(&rounded(log))?);
        return Ok(());
    }

    if log.is_empty() {
        println!("No days logged yet.");
        return Ok(());
    }
    println!("{}", render_table(log));
    Ok(())
}

pub fn status() -> CliResult {
    let config = Config::load_or_default();
    let tracker = open_tracker()?;
    let progress = Progress::from_engine(tracker.engine(), config.goal.target_energy);
    println!("{}", serde_json::to_string_pretty(&progress)?);
    Ok(())
}

pub fn reset(yes: bool) -> CliResult {
    if !yes {
        return Err("refusing to delete the log without --yes".into());
    }
    let mut tracker = open_tracker()?;
    tracker.reset()?;
    save_open_day(&tracker)?;
    println!("{{\"type\": \"log_reset\"}}");
    Ok(())
}

/// Entries as shown to users: energy at 2 decimals.
fn rounded(entries: &[DayEntry]) -> Vec<DayEntry> {
    entries.iter().map(DayEntry::rounded).collect()
}

fn render_table(log: &[DayEntry]) -> String {
    let mut out = format!(
        "{:>5}  {:<8}  {:>7}  {:>9}  {:>8}  {:>9}",
        "day", "kind", "minutes", "energy", "change", "factor"
    );
    for e in log {
        let (kind, change, factor) = if e.practice {
            (
                "practice",
                format!("{:+.2}", e.gain.unwrap_or_default()),
                format!("{:.6}", e.growth_factor.unwrap_or_default()),
            )
        } else {
            ("skip", format!("{:+.2}", -e.loss.unwrap_or_default()), "-".to_string())
        };
        out.push_str(&format!(
            "\n{:>5}  {:<8}  {:>7}  {:>9.2}  {:>8}  {:>9}",
            e.day, kind, e.minutes, e.energy, change, factor
        ));
    }
    out
}
