//! User-adjustable timer settings.
//!
//! Durations are stored in minutes (that is what the snapshot carries) and
//! handed to the engine in seconds. Validation happens here, at the settings
//! boundary: the engine assumes every duration is positive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Upper bound for a single configured duration (one day).
pub const MAX_DURATION_MIN: u32 = 24 * 60;

/// Timer mode. Each mode has its own configured duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    #[default]
    Focus,
    Short,
    Long,
}

impl TimerMode {
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus",
            TimerMode::Short => "Short Break",
            TimerMode::Long => "Long Break",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimerMode::Focus => "focus",
            TimerMode::Short => "short",
            TimerMode::Long => "long",
        };
        f.write_str(s)
    }
}

impl FromStr for TimerMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focus" | "pomodoro" => Ok(TimerMode::Focus),
            "short" | "short-break" => Ok(TimerMode::Short),
            "long" | "long-break" => Ok(TimerMode::Long),
            other => Err(ValidationError::InvalidValue {
                field: "mode".into(),
                message: format!("unknown mode '{other}' (expected focus, short or long)"),
            }),
        }
    }
}

/// Completion sound chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SoundKind {
    #[default]
    Chime,
    Retro,
    Bell,
}

impl FromStr for SoundKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chime" => Ok(SoundKind::Chime),
            "retro" => Ok(SoundKind::Retro),
            "bell" => Ok(SoundKind::Bell),
            other => Err(ValidationError::InvalidValue {
                field: "soundType".into(),
                message: format!("unknown sound '{other}' (expected chime, retro or bell)"),
            }),
        }
    }
}

/// Persisted timer settings.
///
/// Field names follow the snapshot layout (`focusTime`, `shortBreak`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    /// Focus duration in minutes.
    #[serde(default = "default_focus_time")]
    pub focus_time: u32,
    /// Short break duration in minutes.
    #[serde(default = "default_short_break")]
    pub short_break: u32,
    /// Long break duration in minutes.
    #[serde(default = "default_long_break")]
    pub long_break: u32,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default)]
    pub sound_type: SoundKind,
    #[serde(default)]
    pub dark_mode: bool,
}

fn default_focus_time() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    20
}
fn default_true() -> bool {
    true
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_time: default_focus_time(),
            short_break: default_short_break(),
            long_break: default_long_break(),
            sound_enabled: true,
            sound_type: SoundKind::Chime,
            dark_mode: false,
        }
    }
}

impl TimerSettings {
    pub fn focus_seconds(&self) -> u32 {
        self.focus_time.saturating_mul(60)
    }

    pub fn short_break_seconds(&self) -> u32 {
        self.short_break.saturating_mul(60)
    }

    pub fn long_break_seconds(&self) -> u32 {
        self.long_break.saturating_mul(60)
    }

    /// Full duration in seconds for `mode`.
    pub fn duration_secs(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus_seconds(),
            TimerMode::Short => self.short_break_seconds(),
            TimerMode::Long => self.long_break_seconds(),
        }
    }

    /// Reject zero or oversized durations.
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, minutes) in [
            ("focusTime", self.focus_time),
            ("shortBreak", self.short_break),
            ("longBreak", self.long_break),
        ] {
            if minutes == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: "duration must be at least 1 minute".into(),
                });
            }
            if minutes > MAX_DURATION_MIN {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: format!("duration must not exceed {MAX_DURATION_MIN} minutes"),
                });
            }
        }
        Ok(())
    }
}

/// Partial update applied through [`TimerSettings::with_changes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsChanges {
    pub focus_time: Option<u32>,
    pub short_break: Option<u32>,
    pub long_break: Option<u32>,
    pub sound_enabled: Option<bool>,
    pub sound_type: Option<SoundKind>,
    pub dark_mode: Option<bool>,
}

impl TimerSettings {
    /// Apply `changes` and validate the result. `self` is left untouched.
    pub fn with_changes(&self, changes: &SettingsChanges) -> Result<Self, ValidationError> {
        let mut next = *self;
        if let Some(v) = changes.focus_time {
            next.focus_time = v;
        }
        if let Some(v) = changes.short_break {
            next.short_break = v;
        }
        if let Some(v) = changes.long_break {
            next.long_break = v;
        }
        if let Some(v) = changes.sound_enabled {
            next.sound_enabled = v;
        }
        if let Some(v) = changes.sound_type {
            next.sound_type = v;
        }
        if let Some(v) = changes.dark_mode {
            next.dark_mode = v;
        }
        next.validate()?;
        Ok(next)
    }
}
