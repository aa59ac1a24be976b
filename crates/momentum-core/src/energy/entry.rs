use serde::{Deserialize, Serialize};

use super::growth::{growth_factor, round_energy, round_factor, DECAY_RATE};

/// One day of the log: what happened and the energy it left behind.
///
/// Entries are never patched field by field. A recompute derives a fresh
/// entry from the start energy and replaces the old one wholesale.
///
/// Energy values are kept at full precision so the next day chains from the
/// exact result. Use [`DayEntry::rounded`] for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayEntry {
    pub day: u32,
    pub practice: bool,
    /// Always 0 on skip days.
    pub minutes: i64,
    /// Energy after this day's effect.
    pub energy: f64,
    #[serde(default)]
    pub gain: Option<f64>,
    #[serde(default)]
    pub loss: Option<f64>,
    #[serde(default)]
    pub growth_factor: Option<f64>,
}

impl DayEntry {
    /// Practice transition from `start_energy`.
    pub fn practice(day: u32, minutes: i64, start_energy: f64) -> Self {
        let factor = growth_factor(minutes);
        let energy = start_energy * factor;
        Self {
            day,
            practice: true,
            minutes,
            energy,
            gain: Some(energy - start_energy),
            loss: None,
            growth_factor: Some(round_factor(factor)),
        }
    }

    /// Skip transition from `start_energy`: a fixed 10% decay.
    pub fn skip(day: u32, start_energy: f64) -> Self {
        let loss = start_energy * DECAY_RATE;
        Self {
            day,
            practice: false,
            minutes: 0,
            energy: start_energy - loss,
            gain: None,
            loss: Some(loss),
            growth_factor: None,
        }
    }

    /// Re-derive this entry from a new start energy, keeping its kind and minutes.
    pub fn rederive(&self, start_energy: f64) -> Self {
        if self.practice {
            Self::practice(self.day, self.minutes, start_energy)
        } else {
            Self::skip(self.day, start_energy)
        }
    }

    /// Copy with `energy` rounded to the 2 decimals shown to users.
    pub fn rounded(&self) -> Self {
        Self {
            energy: round_energy(self.energy),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn practice_populates_gain_and_factor() {
        let entry = DayEntry::practice(1, 40, 1.0);
        assert!((entry.energy - 1.052496).abs() < 1e-12);
        assert!((entry.gain.unwrap() - 0.052496).abs() < 1e-12);
        assert_eq!(entry.growth_factor, Some(1.052496));
        assert!(entry.loss.is_none());
    }

    #[test]
    fn skip_decays_ten_percent() {
        let entry = DayEntry::skip(2, 20.0);
        assert!(!entry.practice);
        assert_eq!(entry.minutes, 0);
        assert!((entry.energy - 18.0).abs() < 1e-12);
        assert!((entry.loss.unwrap() - 2.0).abs() < 1e-12);
        assert!(entry.gain.is_none());
        assert!(entry.growth_factor.is_none());
    }

    #[test]
    fn rederive_keeps_kind() {
        let practice = DayEntry::practice(4, 60, 2.0);
        let again = practice.rederive(3.0);
        assert!(again.practice);
        assert_eq!(again.minutes, 60);
        assert!(again.energy > 3.0);

        let skip = DayEntry::skip(5, 2.0).rederive(3.0);
        assert!((skip.energy - 2.7).abs() < 1e-12);
    }

    #[test]
    fn small_gains_accumulate_without_rounding() {
        let mut energy = 1.0;
        for day in 1..=10 {
            energy = DayEntry::practice(day, 5, energy).energy;
        }
        assert!(energy > 1.02, "ten 5-minute days should compound, got {energy}");
    }

    #[test]
    fn rounded_only_touches_energy() {
        let skip = DayEntry::skip(2, 1.052496);
        let shown = skip.rounded();
        assert_eq!(shown.energy, 0.95);
        assert_eq!(shown.loss, skip.loss);
        assert!((skip.energy - 0.9472464).abs() < 1e-12);
    }
}
