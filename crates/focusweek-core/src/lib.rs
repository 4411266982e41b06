//! # FocusWeek Core Library
//!
//! Business logic for FocusWeek: a weekly planner (at most three tasks a
//! day) paired with a Pomodoro-style focus timer and an "external brain"
//! notes list. The CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Focus-cycle engine**: a synchronous state machine advanced by an
//!   explicit `tick()`; it emits sound and persistence requests as events
//!   instead of performing them
//! - **Planner**: task, chunk and note stores with their validation rules
//! - **Session**: owns engine, stores, one persistence gateway and one
//!   notification sink; routes engine events and saves eagerly
//! - **Storage**: versioned JSON snapshot behind a gateway trait, with a
//!   local file backend and a SQLite document backend keyed by user
//!
//! ## Key Components
//!
//! - [`FocusCycleEngine`]: timer/cycle state machine
//! - [`Session`]: command entry point and persistence boundary
//! - [`CountdownDriver`]: once-per-second tokio driver
//! - [`PersistenceGateway`]: storage strategy trait
//! - [`Config`]: application configuration

pub mod error;
pub mod events;
pub mod notify;
pub mod planner;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{Event, Sound};
pub use notify::{NotificationSink, RecordingSink, SilentSink};
pub use planner::{Chunk, Note, NoteStore, Task, TaskStatus, TaskStore, MAX_TASKS_PER_DAY};
pub use session::{Command, CountdownDriver, DriverExit, Session, SessionView, SharedSession};
pub use storage::{
    open_gateway, Config, ConnectionStatus, DocumentGateway, LocalGateway, MemoryGateway,
    PersistenceGateway, Snapshot,
};
pub use timer::{FocusCycleEngine, SoundKind, TimerMode, TimerSettings, TimerState};
