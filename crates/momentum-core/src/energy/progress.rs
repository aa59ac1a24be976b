//! Progress summary derived from an energy log.

use serde::{Deserialize, Serialize};

use super::engine::EnergyEngine;
use super::growth::round_energy;

/// Summary for display. Energy figures are rounded to 2 decimals; the goal
/// check uses the exact value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub current_day: u32,
    pub current_energy: f64,
    pub target_energy: f64,
    /// 0.0 .. 100.0
    pub percent_of_target: f64,
    pub goal_reached: bool,
    pub days_logged: u64,
    pub practice_days: u64,
    pub skip_days: u64,
    pub total_minutes: i64,
    pub best_energy: f64,
    /// Consecutive practice days at the end of the log.
    pub current_streak: u64,
}

impl Progress {
    pub fn from_engine(engine: &EnergyEngine, target_energy: f64) -> Self {
        let log = engine.log();
        let practice_days = log.iter().filter(|e| e.practice).count() as u64;
        let total_minutes: i64 = log.iter().filter(|e| e.practice).map(|e| e.minutes).sum();
        let best_energy = log
            .iter()
            .map(|e| e.energy)
            .fold(engine.current_energy(), f64::max);
        let current_streak = log.iter().rev().take_while(|e| e.practice).count() as u64;

        let current_energy = engine.current_energy();
        let percent_of_target = if target_energy > 0.0 {
            round_energy((current_energy / target_energy * 100.0).min(100.0))
        } else {
            100.0
        };

        Self {
            current_day: engine.current_day(),
            current_energy: round_energy(current_energy),
            target_energy,
            percent_of_target,
            goal_reached: current_energy >= target_energy,
            days_logged: log.len() as u64,
            practice_days,
            skip_days: log.len() as u64 - practice_days,
            total_minutes,
            best_energy: round_energy(best_energy),
            current_streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::TARGET_ENERGY;

    #[test]
    fn empty_log() {
        let progress = Progress::from_engine(&EnergyEngine::new(), TARGET_ENERGY);
        assert_eq!(progress.days_logged, 0);
        assert_eq!(progress.current_energy, 1.0);
        assert_eq!(progress.percent_of_target, 1.0);
        assert_eq!(progress.best_energy, 1.0);
        assert!(!progress.goal_reached);
    }

    #[test]
    fn counts_and_streak() {
        let mut engine = EnergyEngine::new();
        engine.log_practice(30).unwrap();
        engine.advance_day().unwrap();
        engine.advance_day().unwrap();
        engine.log_practice(45).unwrap();
        engine.advance_day().unwrap();
        engine.log_practice(15).unwrap();

        let progress = Progress::from_engine(&engine, TARGET_ENERGY);
        assert_eq!(progress.days_logged, 4);
        assert_eq!(progress.practice_days, 3);
        assert_eq!(progress.skip_days, 1);
        assert_eq!(progress.total_minutes, 90);
        assert_eq!(progress.current_streak, 2);
        assert_eq!(progress.current_day, 4);
    }

    #[test]
    fn percent_is_capped() {
        let mut engine = EnergyEngine::new();
        for _ in 0..40 {
            engine.log_practice(120).unwrap();
            engine.advance_day().unwrap();
        }
        let progress = Progress::from_engine(&engine, TARGET_ENERGY);
        assert!(progress.goal_reached);
        assert_eq!(progress.percent_of_target, 100.0);
    }
}
