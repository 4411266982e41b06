//! Versioned persistence snapshot.
//!
//! ```json
//! {
//!   "version": 1,
//!   "settings": { "focusTime": 25, "shortBreak": 5, "longBreak": 20, ... },
//!   "tasks": [ ... ],
//!   "notes": [ ... ],
//!   "cycleCount": 2,
//!   "timer": { "mode": "focus", "remainingSeconds": 1200, "isRunning": true, ... },
//!   "savedAt": "2026-10-17T09:00:00Z"
//! }
//! ```
//!
//! Snapshots without a `version` field are the legacy layout (version 0):
//! same fields, numeric ids, no `timer`/`savedAt`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StorageError;
use crate::planner::{Note, Task, DAYS, MAX_TASKS_PER_DAY};
use crate::timer::{LiveTimer, TimerSettings, SESSIONS_BEFORE_LONG_BREAK};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub settings: TimerSettings,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub cycle_count: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer: Option<LiveTimer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            settings: TimerSettings::default(),
            tasks: Vec::new(),
            notes: Vec::new(),
            cycle_count: 0,
            timer: None,
            saved_at: None,
        }
    }
}

impl Snapshot {
    /// Decode a stored snapshot and bring it up to [`SNAPSHOT_VERSION`].
    ///
    /// # Errors
    /// Returns `StorageError::Malformed` for invalid JSON and
    /// `StorageError::UnsupportedVersion` for snapshots from a newer schema.
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        snapshot.upgrade()
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn upgrade(mut self) -> Result<Self, StorageError> {
        if self.version > SNAPSHOT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        if self.version == 0 {
            // Legacy snapshots never stored a live timer.
            self.timer = None;
            self.version = SNAPSHOT_VERSION;
        }
        self.cycle_count = self.cycle_count.min(SESSIONS_BEFORE_LONG_BREAK);
        self.repair_days();
        if let Some(timer) = self.timer.as_mut() {
            let linked = timer.active_task_id.as_deref();
            if linked.is_some_and(|id| !self.tasks.iter().any(|t| t.id == id)) {
                timer.active_task_id = None;
            }
        }
        Ok(self)
    }

    /// Move tasks sitting on an unknown day, or past the per-day limit, to
    /// the first day with room. Tasks that fit nowhere are dropped.
    fn repair_days(&mut self) {
        let mut counts = [0usize; DAYS.len()];
        let mut misplaced = Vec::new();
        for (index, task) in self.tasks.iter().enumerate() {
            match counts.get_mut(task.day_index as usize) {
                Some(count) if *count < MAX_TASKS_PER_DAY => *count += 1,
                _ => misplaced.push(index),
            }
        }

        let mut dropped = Vec::new();
        for index in misplaced {
            let task = &mut self.tasks[index];
            match counts.iter().position(|count| *count < MAX_TASKS_PER_DAY) {
                Some(day) => {
                    counts[day] += 1;
                    warn!(
                        task_id = %task.id,
                        from = task.day_index,
                        to = day,
                        "relocating misplaced task"
                    );
                    task.day_index = day as u8;
                }
                None => {
                    warn!(
                        task_id = %task.id,
                        day = task.day_index,
                        "no day has room; dropping task"
                    );
                    dropped.push(index);
                }
            }
        }
        for index in dropped.into_iter().rev() {
            self.tasks.remove(index);
        }
    }
}
