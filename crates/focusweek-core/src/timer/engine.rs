//! Focus-cycle engine.
//!
//! A small state machine over `mode`, `remaining_secs`, `is_running` and
//! `cycle_count`. It does not use internal threads or timers: the caller
//! invokes `tick()` once per second while the timer runs (see
//! [`CountdownDriver`](super::CountdownDriver)).
//!
//! ## Cycle rule
//!
//! ```text
//! focus --(count < 4)--> short --> focus
//! focus --(count = 4)--> long  --> focus (count reset to 0)
//! ```
//!
//! The rule fires only when a countdown reaches zero. Manual mode switches
//! never count or reset sessions.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = FocusCycleEngine::new(TimerSettings::default());
//! engine.start();
//! // Once per second:
//! for event in engine.tick() { /* route sounds and persistence */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::settings::{TimerMode, TimerSettings};
use crate::events::{Event, Sound};

/// Completed focus sessions that trigger a long break.
pub const SESSIONS_BEFORE_LONG_BREAK: u8 = 4;

/// Seconds at the end of a countdown that produce a tick sound.
const TICK_SOUND_WINDOW: std::ops::RangeInclusive<u32> = 1..=5;

/// Observable timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub mode: TimerMode,
    pub remaining_seconds: u32,
    pub is_running: bool,
    /// Completed focus sessions since the last long break, in `0..=4`.
    pub cycle_count: u8,
}

/// Persisted form of the live countdown.
///
/// The cycle count is persisted separately as a top-level snapshot field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveTimer {
    pub mode: TimerMode,
    pub remaining_seconds: u32,
    pub is_running: bool,
    #[serde(default)]
    pub active_task_id: Option<String>,
}

/// Core focus-cycle engine.
#[derive(Debug, Clone)]
pub struct FocusCycleEngine {
    settings: TimerSettings,
    state: TimerState,
    /// Weak link to the task being focused on. The task may be deleted
    /// independently; the owner must then call `detach_task`.
    active_task: Option<String>,
}

impl FocusCycleEngine {
    /// Create an engine in focus mode with a full, stopped countdown.
    pub fn new(settings: TimerSettings) -> Self {
        Self {
            state: TimerState {
                mode: TimerMode::Focus,
                remaining_seconds: settings.focus_seconds(),
                is_running: false,
                cycle_count: 0,
            },
            settings,
            active_task: None,
        }
    }

    /// Rebuild an engine from persisted parts.
    ///
    /// `cycle_count` is clamped into `0..=4` and the remaining time is
    /// bounded by the configured duration of the restored mode.
    pub fn restore(settings: TimerSettings, cycle_count: u8, live: Option<LiveTimer>) -> Self {
        let mut engine = Self::new(settings);
        engine.state.cycle_count = cycle_count.min(SESSIONS_BEFORE_LONG_BREAK);
        if let Some(live) = live {
            let full = settings.duration_secs(live.mode);
            engine.state.mode = live.mode;
            engine.state.remaining_seconds = live.remaining_seconds.min(full);
            engine.state.is_running = live.is_running && engine.state.remaining_seconds > 0;
            engine.active_task = live.active_task_id;
        }
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    pub fn remaining_secs(&self) -> u32 {
        self.state.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn cycle_count(&self) -> u8 {
        self.state.cycle_count
    }

    pub fn active_task(&self) -> Option<&str> {
        self.active_task.as_deref()
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    /// Full duration of the current mode in seconds.
    pub fn total_secs(&self) -> u32 {
        self.settings.duration_secs(self.state.mode)
    }

    /// 0.0 .. 1.0 progress within the current countdown.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.state.remaining_seconds as f64 / total as f64)
    }

    pub fn live_timer(&self) -> LiveTimer {
        LiveTimer {
            mode: self.state.mode,
            remaining_seconds: self.state.remaining_seconds,
            is_running: self.state.is_running,
            active_task_id: self.active_task.clone(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the countdown. No-op when already running or when the
    /// countdown is at zero (reset first).
    pub fn start(&mut self) -> Vec<Event> {
        if self.state.is_running || self.state.remaining_seconds == 0 {
            return Vec::new();
        }
        self.state.is_running = true;
        vec![Event::TimerStarted {
            mode: self.state.mode,
            remaining_secs: self.state.remaining_seconds,
            at: Utc::now(),
        }]
    }

    /// Stop the countdown. Never touches `remaining_secs` or `mode`.
    pub fn pause(&mut self) -> Vec<Event> {
        if !self.state.is_running {
            return Vec::new();
        }
        self.state.is_running = false;
        vec![Event::TimerPaused {
            remaining_secs: self.state.remaining_seconds,
            at: Utc::now(),
        }]
    }

    pub fn toggle(&mut self) -> Vec<Event> {
        if self.state.is_running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Stray calls while stopped are ignored.
    pub fn tick(&mut self) -> Vec<Event> {
        if !self.state.is_running || self.state.remaining_seconds == 0 {
            return Vec::new();
        }

        let mut events = Vec::new();
        self.state.remaining_seconds -= 1;

        if self.settings.sound_enabled && TICK_SOUND_WINDOW.contains(&self.state.remaining_seconds) {
            events.push(Event::PlaySound { sound: Sound::Tick });
        }

        if self.state.remaining_seconds == 0 {
            self.state.is_running = false;
            events.push(Event::PlaySound {
                sound: self.settings.sound_type.into(),
            });
            let finished = self.state.mode;
            self.complete_session();
            debug!(
                from = %finished,
                to = %self.state.mode,
                cycle_count = self.state.cycle_count,
                "countdown finished"
            );
            events.push(Event::SessionCompleted {
                mode: finished,
                next_mode: self.state.mode,
                cycle_count: self.state.cycle_count,
                at: Utc::now(),
            });
            events.push(Event::PersistRequested);
        }

        events
    }

    /// Stop and refill the countdown for the current mode.
    pub fn reset(&mut self) -> Vec<Event> {
        self.state.is_running = false;
        self.state.remaining_seconds = self.total_secs();
        vec![Event::TimerReset {
            mode: self.state.mode,
            remaining_secs: self.state.remaining_seconds,
            at: Utc::now(),
        }]
    }

    /// Manually select a mode. Does not alter `cycle_count`.
    pub fn switch_mode(&mut self, mode: TimerMode) -> Vec<Event> {
        let from = self.state.mode;
        self.state.is_running = false;
        self.state.mode = mode;
        self.state.remaining_seconds = self.settings.duration_secs(mode);
        vec![Event::ModeSwitched {
            from,
            to: mode,
            remaining_secs: self.state.remaining_seconds,
            at: Utc::now(),
        }]
    }

    pub fn reset_cycle(&mut self) -> Vec<Event> {
        self.state.cycle_count = 0;
        vec![Event::CycleReset { at: Utc::now() }, Event::PersistRequested]
    }

    /// Focus on `task_id`.
    ///
    /// A new task starts a fresh focus session. Re-attaching the current
    /// task toggles the countdown without touching the remaining time.
    pub fn attach_task(&mut self, task_id: &str) -> Vec<Event> {
        if self.active_task.as_deref() == Some(task_id) {
            return self.toggle();
        }

        self.active_task = Some(task_id.to_string());
        self.state.mode = TimerMode::Focus;
        self.state.remaining_seconds = self.settings.focus_seconds();
        self.state.is_running = true;
        let at = Utc::now();
        vec![
            Event::TaskAttached {
                task_id: task_id.to_string(),
                at,
            },
            Event::TimerStarted {
                mode: TimerMode::Focus,
                remaining_secs: self.state.remaining_seconds,
                at,
            },
        ]
    }

    /// Clear the link when it points at `task_id` and pause.
    pub fn detach_task(&mut self, task_id: &str) -> Vec<Event> {
        if self.active_task.as_deref() != Some(task_id) {
            return Vec::new();
        }
        self.active_task = None;
        let mut events = vec![Event::TaskDetached {
            task_id: task_id.to_string(),
            at: Utc::now(),
        }];
        events.extend(self.pause());
        events
    }

    /// Replace the settings.
    ///
    /// A stopped countdown is refilled with the new duration; a running one
    /// keeps its remaining time, bounded by the new duration. Callers
    /// validate `settings` first.
    pub fn apply_settings(&mut self, settings: TimerSettings) {
        self.settings = settings;
        let full = self.total_secs();
        if self.state.is_running {
            self.state.remaining_seconds = self.state.remaining_seconds.min(full);
        } else {
            self.state.remaining_seconds = full;
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_session(&mut self) {
        let (mode, remaining) = match self.state.mode {
            TimerMode::Focus => {
                self.state.cycle_count = (self.state.cycle_count + 1).min(SESSIONS_BEFORE_LONG_BREAK);
                if self.state.cycle_count >= SESSIONS_BEFORE_LONG_BREAK {
                    (TimerMode::Long, self.settings.long_break_seconds())
                } else {
                    (TimerMode::Short, self.settings.short_break_seconds())
                }
            }
            TimerMode::Short => (TimerMode::Focus, self.settings.focus_seconds()),
            TimerMode::Long => {
                self.state.cycle_count = 0;
                (TimerMode::Focus, self.settings.focus_seconds())
            }
        };
        self.state.mode = mode;
        self.state.remaining_seconds = remaining;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SoundKind;
    use proptest::prelude::*;

    fn quick_settings() -> TimerSettings {
        TimerSettings {
            focus_time: 1,
            short_break: 1,
            long_break: 2,
            ..TimerSettings::default()
        }
    }

    fn run_to_zero(engine: &mut FocusCycleEngine) -> Vec<Event> {
        engine.start();
        let mut events = Vec::new();
        for _ in 0..engine.remaining_secs() {
            events.extend(engine.tick());
        }
        events
    }

    fn completions(events: &[Event]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, Event::SessionCompleted { .. }))
            .count()
    }

    #[test]
    fn new_engine_is_stopped_in_focus() {
        let engine = FocusCycleEngine::new(TimerSettings::default());
        let state = engine.state();
        assert_eq!(state.mode, TimerMode::Focus);
        assert_eq!(state.remaining_seconds, 1500);
        assert!(!state.is_running);
        assert_eq!(state.cycle_count, 0);
        assert!(engine.active_task().is_none());
    }

    #[test]
    fn start_pause_toggle() {
        let mut engine = FocusCycleEngine::new(TimerSettings::default());
        assert_eq!(engine.start().len(), 1);
        assert!(engine.is_running());
        assert!(engine.start().is_empty(), "start is idempotent");

        assert_eq!(engine.pause().len(), 1);
        assert!(!engine.is_running());
        assert!(engine.pause().is_empty());

        engine.toggle();
        assert!(engine.is_running());
        engine.toggle();
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn start_at_zero_is_noop() {
        let mut engine = FocusCycleEngine::restore(
            TimerSettings::default(),
            0,
            Some(LiveTimer {
                mode: TimerMode::Focus,
                remaining_seconds: 0,
                is_running: false,
                active_task_id: None,
            }),
        );
        assert!(engine.start().is_empty());
        assert!(!engine.is_running());
    }

    #[test]
    fn tick_while_stopped_is_noop() {
        let mut engine = FocusCycleEngine::new(TimerSettings::default());
        assert!(engine.tick().is_empty());
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn pomodoro_scenario_reaches_short_break() {
        let mut engine = FocusCycleEngine::new(TimerSettings::default());
        engine.start();
        let mut events = Vec::new();
        for _ in 0..1500 {
            events.extend(engine.tick());
        }

        let state = engine.state();
        assert_eq!(state.mode, TimerMode::Short);
        assert_eq!(state.remaining_seconds, 5 * 60);
        assert_eq!(state.cycle_count, 1);
        assert!(!state.is_running);

        let chimes = events
            .iter()
            .filter(|e| e.sound() == Some(Sound::Chime))
            .count();
        assert_eq!(chimes, 1);
        assert_eq!(completions(&events), 1);
        assert_eq!(events.iter().filter(|e| e.is_persist_request()).count(), 1);
    }

    #[test]
    fn tick_sounds_in_last_five_seconds() {
        let mut engine = FocusCycleEngine::new(quick_settings());
        let events = run_to_zero(&mut engine);
        let ticks = events
            .iter()
            .filter(|e| e.sound() == Some(Sound::Tick))
            .count();
        assert_eq!(ticks, 5);
    }

    #[test]
    fn sound_disabled_still_requests_completion_sound() {
        let settings = TimerSettings {
            sound_enabled: false,
            sound_type: SoundKind::Bell,
            ..quick_settings()
        };
        let mut engine = FocusCycleEngine::new(settings);
        let events = run_to_zero(&mut engine);
        let sounds: Vec<Sound> = events.iter().filter_map(Event::sound).collect();
        assert_eq!(sounds, vec![Sound::Bell]);
        assert_eq!(completions(&events), 1);
    }

    #[test]
    fn completion_uses_configured_sound() {
        let settings = TimerSettings {
            sound_type: SoundKind::Retro,
            ..quick_settings()
        };
        let mut engine = FocusCycleEngine::new(settings);
        let events = run_to_zero(&mut engine);
        assert!(events.iter().any(|e| e.sound() == Some(Sound::Retro)));
        assert!(!events.iter().any(|e| e.sound() == Some(Sound::Chime)));
    }

    #[test]
    fn fourth_focus_completion_goes_to_long_break() {
        let mut engine = FocusCycleEngine::new(quick_settings());
        for expected in 1..=3u8 {
            run_to_zero(&mut engine);
            assert_eq!(engine.mode(), TimerMode::Short);
            assert_eq!(engine.cycle_count(), expected);
            run_to_zero(&mut engine);
            assert_eq!(engine.mode(), TimerMode::Focus);
        }

        run_to_zero(&mut engine);
        assert_eq!(engine.mode(), TimerMode::Long);
        assert_eq!(engine.cycle_count(), 4);
        assert_eq!(engine.remaining_secs(), 120);

        run_to_zero(&mut engine);
        assert_eq!(engine.mode(), TimerMode::Focus);
        assert_eq!(engine.cycle_count(), 0);
        assert_eq!(engine.remaining_secs(), 60);
    }

    #[test]
    fn reset_refills_current_mode_only() {
        let mut engine = FocusCycleEngine::new(quick_settings());
        engine.switch_mode(TimerMode::Long);
        engine.start();
        engine.tick();
        engine.tick();
        engine.reset();
        assert_eq!(engine.mode(), TimerMode::Long);
        assert_eq!(engine.remaining_secs(), 120);
        assert!(!engine.is_running());
    }

    #[test]
    fn switch_mode_keeps_cycle_count() {
        let mut engine = FocusCycleEngine::restore(quick_settings(), 3, None);
        engine.switch_mode(TimerMode::Long);
        assert_eq!(engine.cycle_count(), 3);
        assert_eq!(engine.remaining_secs(), 120);
        engine.switch_mode(TimerMode::Focus);
        assert_eq!(engine.cycle_count(), 3);
    }

    #[test]
    fn reset_cycle_requests_persistence() {
        let mut engine = FocusCycleEngine::restore(quick_settings(), 2, None);
        let events = engine.reset_cycle();
        assert_eq!(engine.cycle_count(), 0);
        assert!(events.iter().any(Event::is_persist_request));
        assert_eq!(engine.mode(), TimerMode::Focus);
        assert_eq!(engine.remaining_secs(), 60);
    }

    #[test]
    fn attach_same_task_toggles_without_reset() {
        let mut engine = FocusCycleEngine::new(TimerSettings::default());
        engine.switch_mode(TimerMode::Short);
        engine.attach_task("a");
        assert_eq!(engine.mode(), TimerMode::Focus);
        assert!(engine.is_running());
        engine.tick();
        engine.tick();

        engine.attach_task("a");
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 1498);

        engine.attach_task("a");
        assert!(engine.is_running());
        assert_eq!(engine.remaining_secs(), 1498);
    }

    #[test]
    fn attach_other_task_starts_fresh_session() {
        let mut engine = FocusCycleEngine::new(TimerSettings::default());
        engine.attach_task("a");
        engine.tick();
        engine.pause();
        engine.attach_task("b");
        assert_eq!(engine.active_task(), Some("b"));
        assert_eq!(engine.remaining_secs(), 1500);
        assert!(engine.is_running());
    }

    #[test]
    fn detach_only_affects_linked_task() {
        let mut engine = FocusCycleEngine::new(TimerSettings::default());
        engine.attach_task("a");
        assert!(engine.detach_task("b").is_empty());
        assert_eq!(engine.active_task(), Some("a"));
        assert!(engine.is_running());

        let events = engine.detach_task("a");
        assert!(engine.active_task().is_none());
        assert!(!engine.is_running());
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn apply_settings_refills_stopped_and_clamps_running() {
        let mut engine = FocusCycleEngine::new(TimerSettings::default());
        engine.apply_settings(TimerSettings {
            focus_time: 50,
            ..TimerSettings::default()
        });
        assert_eq!(engine.remaining_secs(), 3000);

        engine.start();
        engine.tick();
        engine.apply_settings(TimerSettings {
            focus_time: 10,
            ..TimerSettings::default()
        });
        assert_eq!(engine.remaining_secs(), 600);
        assert!(engine.is_running());
    }

    #[test]
    fn restore_clamps_out_of_range_values() {
        let engine = FocusCycleEngine::restore(
            quick_settings(),
            9,
            Some(LiveTimer {
                mode: TimerMode::Short,
                remaining_seconds: 10_000,
                is_running: true,
                active_task_id: Some("t".into()),
            }),
        );
        assert_eq!(engine.cycle_count(), 4);
        assert_eq!(engine.remaining_secs(), 60);
        assert!(engine.is_running());
        assert_eq!(engine.active_task(), Some("t"));
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let mut engine = FocusCycleEngine::new(quick_settings());
        assert_eq!(engine.progress(), 0.0);
        engine.start();
        for _ in 0..30 {
            engine.tick();
        }
        assert!((engine.progress() - 0.5).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn ticking_remaining_times_completes_exactly_once(
            focus in 1u32..5,
            short in 1u32..5,
            long in 1u32..5,
            cycle in 0u8..4,
            mode_idx in 0usize..3,
        ) {
            let settings = TimerSettings {
                focus_time: focus,
                short_break: short,
                long_break: long,
                ..TimerSettings::default()
            };
            let mode = [TimerMode::Focus, TimerMode::Short, TimerMode::Long][mode_idx];
            let mut engine = FocusCycleEngine::restore(settings, cycle, None);
            engine.switch_mode(mode);
            let events = run_to_zero(&mut engine);
            prop_assert_eq!(completions(&events), 1);
            prop_assert!(!engine.is_running());
            prop_assert!(engine.cycle_count() <= SESSIONS_BEFORE_LONG_BREAK);
            prop_assert_eq!(engine.remaining_secs(), engine.total_secs());
        }

        #[test]
        fn focus_completion_counts_sessions(cycle in 0u8..4) {
            let mut engine = FocusCycleEngine::restore(quick_settings(), cycle, None);
            run_to_zero(&mut engine);
            prop_assert_eq!(engine.cycle_count(), cycle + 1);
            let expected = if cycle + 1 >= SESSIONS_BEFORE_LONG_BREAK {
                TimerMode::Long
            } else {
                TimerMode::Short
            };
            prop_assert_eq!(engine.mode(), expected);
        }

        #[test]
        fn switch_mode_never_touches_cycle_count(
            cycle in 0u8..=4,
            switches in proptest::collection::vec(0usize..3, 1..20),
        ) {
            let mut engine = FocusCycleEngine::restore(quick_settings(), cycle, None);
            for idx in switches {
                let mode = [TimerMode::Focus, TimerMode::Short, TimerMode::Long][idx];
                engine.switch_mode(mode);
                prop_assert_eq!(engine.cycle_count(), cycle);
                prop_assert!(!engine.is_running());
            }
        }
    }
}
