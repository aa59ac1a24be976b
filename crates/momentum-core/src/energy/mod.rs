//! Energy progression: growth factor, per-day entries and the log engine.

mod engine;
mod entry;
mod growth;
mod progress;

pub use engine::{Changeset, EnergyEngine};
pub use entry::DayEntry;
pub use growth::{
    growth_factor, round_energy, round_factor, DECAY_RATE, INITIAL_ENERGY, TARGET_ENERGY,
};
pub use progress::Progress;
