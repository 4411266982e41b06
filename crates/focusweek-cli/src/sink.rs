//! Terminal notification sink.

use std::io::Write;

use focusweek_core::timer::SESSIONS_BEFORE_LONG_BREAK;
use focusweek_core::{NotificationSink, Sound, TimerMode};

/// Rings the terminal bell for completion sounds and prints completion
/// notices to stderr. Countdown ticks are silent.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn play(&mut self, sound: Sound) {
        if sound != Sound::Tick {
            let mut stderr = std::io::stderr();
            let _ = stderr.write_all(b"\x07");
            let _ = stderr.flush();
        }
    }

    fn session_completed(&mut self, finished: TimerMode, next: TimerMode, cycle_count: u8) {
        eprintln!(
            "{} finished. Next up: {} ({cycle_count}/{SESSIONS_BEFORE_LONG_BREAK} focus sessions)",
            finished.label(),
            next.label(),
        );
    }
}
