//! Daily growth and decay constants.
//!
//! The linear growth formula was tuned so that 90 days at 40 minutes, or
//! 30 days at 120 minutes, compound from 1.0 to roughly 100.0.

/// Energy every log starts from.
pub const INITIAL_ENERGY: f64 = 1.0;

/// Reference goal used for progress messaging.
pub const TARGET_ENERGY: f64 = 100.0;

/// Fraction of energy lost on a skipped day.
pub const DECAY_RATE: f64 = 0.1;

const BASE_FACTOR: f64 = 0.995776;
const FACTOR_PER_MINUTE: f64 = 0.001418;

/// Multiplicative growth for a practice day of `minutes`.
///
/// Total over all inputs. Zero minutes yields a factor below 1.0, so callers
/// that do not want "empty" practice to shrink energy must clamp beforehand.
pub fn growth_factor(minutes: i64) -> f64 {
    BASE_FACTOR + minutes as f64 * FACTOR_PER_MINUTE
}

/// Round to the 2 decimals energy values are stored with.
pub fn round_energy(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to the 6 decimals growth factors are stored with.
pub fn round_factor(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
