use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

/// Timer commands delivered by the UI or the countdown driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "arg", rename_all = "snake_case")]
pub enum Command {
    Start,
    Pause,
    Toggle,
    Reset,
    SwitchMode(TimerMode),
    ResetCycle,
    /// One wall-clock second elapsed.
    Tick,
    /// Focus on a task. Focusing the already-active task toggles the timer.
    AttachTask(String),
    DetachTask(String),
}
