//! Notification sinks: where sound requests and completion notices go.

use std::sync::{Arc, Mutex};

use crate::events::Sound;
use crate::timer::TimerMode;

/// Receives fire-and-forget notifications from the session.
pub trait NotificationSink: Send {
    fn play(&mut self, sound: Sound);

    /// A countdown finished; `next` is the mode the engine moved to.
    fn session_completed(&mut self, finished: TimerMode, next: TimerMode, cycle_count: u8) {
        let _ = (finished, next, cycle_count);
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl NotificationSink for SilentSink {
    fn play(&mut self, _sound: Sound) {}
}

/// Something a [`RecordingSink`] received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Sound(Sound),
    Completed {
        finished: TimerMode,
        next: TimerMode,
        cycle_count: u8,
    },
}

/// Keeps every notification in a shared log.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn sounds(&self) -> Vec<Sound> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Sound(sound) => Some(sound),
                Notification::Completed { .. } => None,
            })
            .collect()
    }

    fn push(&self, notification: Notification) {
        if let Ok(mut log) = self.log.lock() {
            log.push(notification);
        }
    }
}

impl NotificationSink for RecordingSink {
    fn play(&mut self, sound: Sound) {
        self.push(Notification::Sound(sound));
    }

    fn session_completed(&mut self, finished: TimerMode, next: TimerMode, cycle_count: u8) {
        self.push(Notification::Completed {
            finished,
            next,
            cycle_count,
        });
    }
}
