use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{SoundKind, TimerMode};

/// Sound cue requested from the notification sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sound {
    /// Countdown tick during the last five seconds.
    Tick,
    Chime,
    Retro,
    Bell,
}

impl From<SoundKind> for Sound {
    fn from(kind: SoundKind) -> Self {
        match kind {
            SoundKind::Chime => Sound::Chime,
            SoundKind::Retro => Sound::Retro,
            SoundKind::Bell => Sound::Bell,
        }
    }
}

/// Every engine command produces zero or more events.
///
/// `PlaySound` and `PersistRequested` are side-effect requests: the engine
/// never performs them itself, the owning session routes them to the
/// notification sink and the persistence gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        from: TimerMode,
        to: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    CycleReset {
        at: DateTime<Utc>,
    },
    TaskAttached {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskDetached {
        task_id: String,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero and the cycle rule picked the next mode.
    SessionCompleted {
        mode: TimerMode,
        next_mode: TimerMode,
        cycle_count: u8,
        at: DateTime<Utc>,
    },
    PlaySound {
        sound: Sound,
    },
    PersistRequested,
}

impl Event {
    pub fn is_persist_request(&self) -> bool {
        matches!(self, Event::PersistRequested)
    }

    pub fn sound(&self) -> Option<Sound> {
        match self {
            Event::PlaySound { sound } => Some(*sound),
            _ => None,
        }
    }
}
