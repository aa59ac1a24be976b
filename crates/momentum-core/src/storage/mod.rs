mod config;
pub mod database;
pub mod memory;
pub mod migrations;

pub use config::{Config, DisplayConfig, GoalConfig, PracticeConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::energy::{Changeset, DayEntry};
use crate::error::{ConfigError, DatabaseError};

/// Persistence collaborator for the energy log.
///
/// Writes are keyed by day so that replaying a changeset is harmless.
pub trait LogStore {
    /// All stored entries, ordered by day.
    fn load_log(&mut self) -> Result<Vec<DayEntry>, DatabaseError>;

    /// Insert or replace the given entries by day.
    fn upsert(&mut self, entries: &[DayEntry]) -> Result<(), DatabaseError>;

    /// Remove every stored entry.
    fn delete_all(&mut self) -> Result<(), DatabaseError>;

    /// Write a whole changeset.
    ///
    /// Stores that can do so should override this to apply the changeset
    /// atomically.
    fn apply(&mut self, changes: &Changeset) -> Result<(), DatabaseError> {
        if changes.delete_all {
            self.delete_all()?;
        }
        if !changes.upserts.is_empty() {
            self.upsert(&changes.upserts)?;
        }
        Ok(())
    }
}

/// Returns the momentum data directory, creating it if needed.
///
/// `MOMENTUM_DATA_DIR` overrides the location outright. Otherwise it is
/// `~/.config/momentum/`, or `~/.config/momentum-dev/` when
/// `MOMENTUM_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("MOMENTUM_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("MOMENTUM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("momentum-dev")
            } else {
                base_dir.join("momentum")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
