//! Practice session timer.
//!
//! A small wall-clock state machine that accumulates practice time across
//! pause/resume intervals. It belongs to the caller: the energy engine only
//! ever receives the finished total in whole minutes.
//!
//! ```text
//! Idle -> Running <-> Paused -> (finish) -> Idle
//! ```
//!
//! All transitions take the current time explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Running,
    Paused,
}

/// Point-in-time view of a session, suitable for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub elapsed_secs: i64,
    /// Whole minutes elapsed so far, rounded down.
    pub elapsed_min: i64,
    pub running_since: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeSession {
    state: SessionState,
    /// Seconds banked from completed running intervals.
    accumulated_secs: i64,
    #[serde(default)]
    running_since: Option<DateTime<Utc>>,
}

impl Default for PracticeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PracticeSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            accumulated_secs: 0,
            running_since: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Total seconds practiced so far, including the running interval.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        let running = self
            .running_since
            .map(|since| (now - since).num_seconds().max(0))
            .unwrap_or(0);
        self.accumulated_secs + running
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        let elapsed_secs = self.elapsed_secs(now);
        SessionSnapshot {
            state: self.state,
            elapsed_secs,
            elapsed_min: elapsed_secs / 60,
            running_since: self.running_since,
        }
    }

    /// Begin a new session. Only valid from `Idle`.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<SessionSnapshot> {
        if self.state != SessionState::Idle {
            return None;
        }
        self.accumulated_secs = 0;
        self.running_since = Some(now);
        self.state = SessionState::Running;
        Some(self.snapshot(now))
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<SessionSnapshot> {
        if self.state != SessionState::Running {
            return None;
        }
        self.bank(now);
        self.state = SessionState::Paused;
        Some(self.snapshot(now))
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<SessionSnapshot> {
        if self.state != SessionState::Paused {
            return None;
        }
        self.running_since = Some(now);
        self.state = SessionState::Running;
        Some(self.snapshot(now))
    }

    /// End the session and return its total in whole minutes.
    ///
    /// Partial minutes are rounded up when `round_up` is set, otherwise
    /// dropped. Returns `None` when no session is in progress.
    pub fn finish(&mut self, now: DateTime<Utc>, round_up: bool) -> Option<i64> {
        if self.state == SessionState::Idle {
            return None;
        }
        let secs = self.elapsed_secs(now);
        *self = Self::new();
        let minutes = if round_up {
            (secs + 59) / 60
        } else {
            secs / 60
        };
        Some(minutes)
    }

    /// Discard the session without producing minutes.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn bank(&mut self, now: DateTime<Utc>) {
        if let Some(since) = self.running_since.take() {
            self.accumulated_secs += (now - since).num_seconds().max(0);
        }
    }
}
