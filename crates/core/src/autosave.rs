//! Debounced autosave scheduling.
//!
//! The scheduler is a pure state machine over caller-supplied instants: it never sleeps and
//! never saves. The wizard asks it whether a save is due, and the session driver sleeps until
//! [`AutosaveScheduler::deadline`]. Every edit pushes the deadline out by the full debounce
//! interval, so a burst of edits produces one save after the last of them.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Why a save was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveTrigger {
    Autosave,
    Manual,
    Navigation,
    Finalize,
    /// Flushing the previous record before another one is opened.
    RecordSwitch,
    /// Flushing pending edits when a session is closed.
    Close,
}

impl fmt::Display for SaveTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaveTrigger::Autosave => "autosave",
            SaveTrigger::Manual => "manual save",
            SaveTrigger::Navigation => "navigation save",
            SaveTrigger::Finalize => "finalize",
            SaveTrigger::RecordSwitch => "record switch",
            SaveTrigger::Close => "close",
        };
        f.write_str(name)
    }
}

/// Single debounce timer, armed by edits and disarmed by firing or by an immediate save.
#[derive(Clone, Debug)]
pub struct AutosaveScheduler {
    debounce: Duration,
    deadline: Option<Instant>,
}

impl AutosaveScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            deadline: None,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Arms the timer, or restarts it if already armed. Returns the new deadline.
    pub fn note_edit(&mut self, now: Instant) -> Instant {
        let deadline = now + self.debounce;
        self.deadline = Some(deadline);
        deadline
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarms and returns true if the timer has expired at `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Disarms without firing. Returns whether a save was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}
