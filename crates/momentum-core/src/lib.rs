//! # Momentum Core Library
//!
//! Core logic for the Momentum habit tracker. Each day is logged as either
//! practice (with a duration in minutes) or a skip, and a single "energy"
//! score compounds from one day to the next. Practice multiplies it by a
//! duration-dependent growth factor. A skip takes 10% off.
//!
//! ## Architecture
//!
//! - **Energy Engine**: a pure value holding the ordered day log. Each
//!   operation returns the rows that must be persisted for it.
//! - **Tracker**: wraps the engine and a [`LogStore`]. It commits in-memory
//!   changes only after the store accepts them.
//! - **Storage**: SQLite log storage plus TOML configuration.
//! - **Session**: a caller-owned practice timer that turns pause/resume
//!   intervals into the minutes handed to the engine.
//!
//! ## Key Components
//!
//! - [`EnergyEngine`]: day log and the energy recurrence
//! - [`Tracker`]: persistence-aware orchestration with rollback
//! - [`Database`]: SQLite implementation of [`LogStore`]
//! - [`Config`]: application configuration management

pub mod energy;
pub mod error;
pub mod session;
pub mod storage;
pub mod tracker;

pub use energy::{
    growth_factor, round_energy, Changeset, DayEntry, EnergyEngine, Progress, DECAY_RATE,
    INITIAL_ENERGY, TARGET_ENERGY,
};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use session::{PracticeSession, SessionSnapshot, SessionState};
pub use storage::{Config, Database, LogStore, MemoryStore};
pub use tracker::Tracker;
