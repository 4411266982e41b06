//! Session: the single owned instance of planner and timer state.
//!
//! A [`Session`] owns the focus-cycle engine, the task and note stores, one
//! [`PersistenceGateway`] and one [`NotificationSink`]. Engine events are
//! routed here: sound requests and completion notices to the sink, persist
//! requests to the gateway. Every task, note, cycle and settings mutation
//! is saved eagerly. Save failures are logged and swallowed; the session
//! keeps working on its in-memory state.
//!
//! Hosts that deliver commands from several threads share the session as a
//! [`SharedSession`]; the mutex is the only lock around the whole state.

mod command;
mod driver;

pub use command::Command;
pub use driver::{CountdownDriver, DriverExit};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::notify::NotificationSink;
use crate::planner::{Chunk, Note, NoteStore, Task, TaskStatus, TaskStore};
use crate::storage::{ConnectionStatus, PersistenceGateway, Snapshot, SNAPSHOT_VERSION};
use crate::timer::{format_clock, FocusCycleEngine, SettingsChanges, TimerSettings, TimerState};

pub type SharedSession = Arc<Mutex<Session>>;

pub struct Session {
    engine: FocusCycleEngine,
    tasks: TaskStore,
    notes: NoteStore,
    gateway: Box<dyn PersistenceGateway>,
    sink: Box<dyn NotificationSink>,
    last_save_error: Option<String>,
    /// Instant at which the running countdown last showed its current
    /// `remaining_seconds`. Stored as `savedAt` so sub-second remainders
    /// survive a load and save.
    clock_anchor: Option<DateTime<Utc>>,
}

/// Read-only view of the session for status displays.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub connection: ConnectionStatus,
    pub timer: TimerState,
    pub clock: String,
    pub progress: f64,
    pub active_task: Option<Task>,
    pub settings: TimerSettings,
    pub task_count: usize,
    pub note_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_save_error: Option<String>,
}

impl Session {
    /// Fresh session with empty stores.
    pub fn new(
        settings: TimerSettings,
        gateway: Box<dyn PersistenceGateway>,
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        Self {
            engine: FocusCycleEngine::new(settings),
            tasks: TaskStore::new(),
            notes: NoteStore::new(),
            gateway,
            sink,
            last_save_error: None,
            clock_anchor: None,
        }
    }

    /// Restore from the gateway, or start fresh with `defaults` when it holds
    /// nothing.
    ///
    /// # Errors
    /// Returns an error when the stored snapshot cannot be read. Nothing is
    /// written in that case, so a newer or damaged snapshot is never
    /// overwritten.
    pub fn load(
        gateway: Box<dyn PersistenceGateway>,
        sink: Box<dyn NotificationSink>,
        defaults: TimerSettings,
    ) -> Result<Self> {
        match gateway.load()? {
            Some(snapshot) => {
                info!(
                    tasks = snapshot.tasks.len(),
                    notes = snapshot.notes.len(),
                    cycle_count = snapshot.cycle_count,
                    "restored session"
                );
                Ok(Self::from_snapshot(snapshot, gateway, sink))
            }
            None => {
                defaults.validate()?;
                info!("no saved session; starting fresh");
                Ok(Self::new(defaults, gateway, sink))
            }
        }
    }

    /// Rebuild a session from `snapshot`.
    ///
    /// A timer that was running when the snapshot was taken is advanced by
    /// the whole wall-clock seconds elapsed since `saved_at`; the leftover
    /// fraction is carried in the next save.
    pub fn from_snapshot(
        snapshot: Snapshot,
        gateway: Box<dyn PersistenceGateway>,
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        Self::from_snapshot_at(snapshot, gateway, sink, Utc::now())
    }

    /// [`Session::from_snapshot`] with an explicit current time.
    pub fn from_snapshot_at(
        snapshot: Snapshot,
        gateway: Box<dyn PersistenceGateway>,
        sink: Box<dyn NotificationSink>,
        now: DateTime<Utc>,
    ) -> Self {
        let settings = match snapshot.settings.validate() {
            Ok(()) => snapshot.settings,
            Err(e) => {
                warn!(error = %e, "stored settings are invalid; using defaults");
                TimerSettings::default()
            }
        };
        let was_running = snapshot.timer.as_ref().is_some_and(|t| t.is_running);
        let mut session = Self {
            engine: FocusCycleEngine::restore(settings, snapshot.cycle_count, snapshot.timer),
            tasks: TaskStore::from_tasks(snapshot.tasks),
            notes: NoteStore::from_notes(snapshot.notes),
            gateway,
            sink,
            last_save_error: None,
            clock_anchor: None,
        };

        if was_running {
            if let Some(saved_at) = snapshot.saved_at {
                if now < saved_at {
                    session.clock_anchor = Some(now);
                } else {
                    let whole = (now - saved_at).num_seconds();
                    session.clock_anchor = Some(saved_at + Duration::seconds(whole));
                    session.catch_up(whole as u64);
                }
            }
        }
        session
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &FocusCycleEngine {
        &self.engine
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn settings(&self) -> &TimerSettings {
        self.engine.settings()
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.gateway.status()
    }

    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }

    pub fn active_task(&self) -> Option<&Task> {
        self.engine.active_task().and_then(|id| self.tasks.get(id))
    }

    pub fn view(&self) -> SessionView {
        let timer = self.engine.state();
        SessionView {
            connection: self.connection(),
            timer,
            clock: format_clock(timer.remaining_seconds),
            progress: self.engine.progress(),
            active_task: self.active_task().cloned(),
            settings: *self.settings(),
            task_count: self.tasks.len(),
            note_count: self.notes.len(),
            last_save_error: self.last_save_error.clone(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            settings: *self.settings(),
            tasks: self.tasks.tasks().to_vec(),
            notes: self.notes.notes().to_vec(),
            cycle_count: self.engine.cycle_count(),
            timer: Some(self.engine.live_timer()),
            saved_at: Some(match self.clock_anchor {
                Some(anchor) if self.engine.is_running() => anchor,
                _ => Utc::now(),
            }),
        }
    }

    // ── Timer commands ───────────────────────────────────────────────

    /// Apply a timer command and route the resulting side-effect requests.
    ///
    /// # Errors
    /// `AttachTask` with an unknown task id is rejected.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<Event>> {
        let before = self.engine.state();
        let events = match command {
            Command::Start => self.engine.start(),
            Command::Pause => self.engine.pause(),
            Command::Toggle => self.engine.toggle(),
            Command::Reset => self.engine.reset(),
            Command::SwitchMode(mode) => self.engine.switch_mode(mode),
            Command::ResetCycle => self.engine.reset_cycle(),
            Command::Tick => self.engine.tick(),
            Command::AttachTask(id) => return self.focus_task(&id),
            Command::DetachTask(id) => self.engine.detach_task(&id),
        };
        self.restamp(before);
        self.route(&events, true);
        Ok(events)
    }

    fn focus_task(&mut self, id: &str) -> Result<Vec<Event>> {
        if !self.tasks.contains(id) {
            return Err(ValidationError::TaskNotFound(id.to_string()).into());
        }
        let fresh = self.engine.active_task() != Some(id);
        let before = self.engine.state();
        let events = self.engine.attach_task(id);
        self.restamp(before);
        self.route(&events, true);
        if fresh {
            self.tasks.set_status(id, TaskStatus::Wip)?;
            self.persist();
        }
        Ok(events)
    }

    /// Save now. Unlike eager saves, the error is returned.
    pub fn save(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        self.gateway.save(&snapshot)?;
        self.last_save_error = None;
        Ok(())
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(&mut self, day: u8, content: &str) -> Result<Task> {
        let task = self.tasks.add_with_content(day, content)?;
        self.persist();
        Ok(task)
    }

    pub fn set_task_content(&mut self, id: &str, content: &str) -> Result<()> {
        self.tasks.set_content(id, content)?;
        self.persist();
        Ok(())
    }

    pub fn set_task_status(&mut self, id: &str, status: TaskStatus) -> Result<()> {
        self.tasks.set_status(id, status)?;
        self.persist();
        Ok(())
    }

    pub fn toggle_task_done(&mut self, id: &str) -> Result<TaskStatus> {
        let status = self.tasks.toggle_done(id)?;
        self.persist();
        Ok(status)
    }

    pub fn move_task(&mut self, id: &str, day: u8, position: Option<usize>) -> Result<()> {
        self.tasks.move_to(id, day, position)?;
        self.persist();
        Ok(())
    }

    /// Delete a task, detaching it from the timer if it is being focused on.
    pub fn delete_task(&mut self, id: &str) -> Result<Task> {
        let task = self.tasks.remove(id)?;
        let before = self.engine.state();
        let events = self.engine.detach_task(id);
        self.restamp(before);
        self.route(&events, true);
        self.persist();
        Ok(task)
    }

    pub fn add_chunk(&mut self, task_id: &str, text: &str) -> Result<Chunk> {
        let chunk = self.tasks.add_chunk(task_id, text)?;
        self.persist();
        Ok(chunk)
    }

    pub fn set_chunk_text(&mut self, task_id: &str, chunk_id: &str, text: &str) -> Result<()> {
        self.tasks.set_chunk_text(task_id, chunk_id, text)?;
        self.persist();
        Ok(())
    }

    pub fn toggle_chunk(&mut self, task_id: &str, chunk_id: &str) -> Result<bool> {
        let done = self.tasks.toggle_chunk(task_id, chunk_id)?;
        self.persist();
        Ok(done)
    }

    pub fn delete_chunk(&mut self, task_id: &str, chunk_id: &str) -> Result<Chunk> {
        let chunk = self.tasks.remove_chunk(task_id, chunk_id)?;
        self.persist();
        Ok(chunk)
    }

    // ── Notes ────────────────────────────────────────────────────────

    pub fn add_note(&mut self, text: &str) -> Result<Note> {
        let note = self.notes.add(text)?;
        self.persist();
        Ok(note)
    }

    pub fn delete_note(&mut self, id: &str) -> Result<Note> {
        let note = self.notes.remove(id)?;
        self.persist();
        Ok(note)
    }

    pub fn clear_notes(&mut self) -> usize {
        let removed = self.notes.clear();
        if removed > 0 {
            self.persist();
        }
        removed
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Validate and apply a settings change.
    ///
    /// # Errors
    /// Zero or oversized durations are rejected and nothing changes.
    pub fn update_settings(&mut self, changes: &SettingsChanges) -> Result<TimerSettings> {
        let next = self.settings().with_changes(changes)?;
        let before = self.engine.state();
        self.engine.apply_settings(next);
        self.restamp(before);
        self.persist();
        Ok(next)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn route(&mut self, events: &[Event], with_sound: bool) {
        let audible = with_sound && self.engine.settings().sound_enabled;
        let mut persist = false;
        for event in events {
            match event {
                Event::PlaySound { sound } if audible => self.sink.play(*sound),
                Event::SessionCompleted {
                    mode,
                    next_mode,
                    cycle_count,
                    ..
                } => self.sink.session_completed(*mode, *next_mode, *cycle_count),
                Event::PersistRequested => persist = true,
                _ => {}
            }
        }
        if persist {
            self.persist();
        }
    }

    /// Move the clock anchor to now when the countdown itself changed.
    fn restamp(&mut self, before: TimerState) {
        let after = self.engine.state();
        if (after.mode, after.remaining_seconds, after.is_running)
            != (before.mode, before.remaining_seconds, before.is_running)
        {
            self.clock_anchor = Some(Utc::now());
        }
    }

    /// Eager save. Failures are logged and remembered, never returned.
    fn persist(&mut self) {
        let snapshot = self.snapshot();
        match self.gateway.save(&snapshot) {
            Ok(()) => self.last_save_error = None,
            Err(e) => {
                warn!(error = %e, "failed to persist session; continuing in memory");
                self.last_save_error = Some(e.to_string());
            }
        }
    }

    /// Replay up to `elapsed` ticks that passed while nobody was driving
    /// the countdown. Stale sound cues are dropped.
    fn catch_up(&mut self, elapsed: u64) {
        let mut ticks = 0u64;
        while ticks < elapsed && self.engine.is_running() {
            let events = self.engine.tick();
            self.route(&events, false);
            ticks += 1;
        }
        if ticks > 0 {
            debug!(ticks, remaining = self.engine.remaining_secs(), "caught up countdown");
        }
    }
}
