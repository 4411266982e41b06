mod clock;
mod engine;
mod settings;

pub use clock::format_clock;
pub use engine::{FocusCycleEngine, LiveTimer, TimerState, SESSIONS_BEFORE_LONG_BREAK};
pub use settings::{SettingsChanges, SoundKind, TimerMode, TimerSettings, MAX_DURATION_MIN};
