//! Weekly planner: tasks split into chunks, plus the "external brain" notes.
//!
//! The week has seven day slots (0 = Monday .. 6 = Sunday) with at most
//! [`MAX_TASKS_PER_DAY`] tasks each.

mod notes;
mod tasks;

pub use notes::{Note, NoteStore};
pub use tasks::TaskStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

pub const MAX_TASKS_PER_DAY: usize = 3;

pub const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Parse a day slot from a digit (`0`-`6`), a full name or a three-letter
/// abbreviation. Matching is case-insensitive.
pub fn parse_day(input: &str) -> Result<u8, ValidationError> {
    let trimmed = input.trim();
    if let Ok(index) = trimmed.parse::<u8>() {
        return check_day(index);
    }
    let lower = trimmed.to_ascii_lowercase();
    DAYS.iter()
        .position(|day| {
            let day = day.to_ascii_lowercase();
            day == lower || (lower.len() == 3 && day.starts_with(&lower))
        })
        .map(|i| i as u8)
        .ok_or_else(|| ValidationError::InvalidValue {
            field: "day".into(),
            message: format!("unknown day '{trimmed}'"),
        })
}

pub(crate) fn check_day(day: u8) -> Result<u8, ValidationError> {
    if (day as usize) < DAYS.len() {
        Ok(day)
    } else {
        Err(ValidationError::DayOutOfRange(day))
    }
}

pub fn day_name(day: u8) -> &'static str {
    DAYS.get(day as usize).copied().unwrap_or("Unknown")
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Ids written by older clients are millisecond timestamps stored as JSON
/// numbers; newer ids are UUID strings.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Task progress status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    /// In progress; set when the task is focused on.
    Wip,
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Wip => "wip",
            TaskStatus::Done => "done",
        };
        f.write_str(s)
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "wip" | "in-progress" => Ok(TaskStatus::Wip),
            "done" => Ok(TaskStatus::Done),
            other => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("unknown status '{other}' (expected todo, wip or done)"),
            }),
        }
    }
}

/// A smaller unit of work inside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// A planned task for one day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub day_index: u8,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(day_index: u8, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            day_index,
            content: content.into(),
            status: TaskStatus::Todo,
            chunks: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// `(done, total)` chunk counts.
    pub fn chunk_progress(&self) -> (usize, usize) {
        let done = self.chunks.iter().filter(|c| c.done).count();
        (done, self.chunks.len())
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_day_accepts_digits_and_names() {
        assert_eq!(parse_day("0").unwrap(), 0);
        assert_eq!(parse_day("6").unwrap(), 6);
        assert_eq!(parse_day("Wednesday").unwrap(), 2);
        assert_eq!(parse_day("fri").unwrap(), 4);
        assert_eq!(parse_day(" SUN ").unwrap(), 6);
    }

    #[test]
    fn parse_day_rejects_unknown() {
        assert_eq!(parse_day("7").unwrap_err(), ValidationError::DayOutOfRange(7));
        assert!(parse_day("someday").is_err());
        assert!(parse_day("mo").is_err());
    }

    #[test]
    fn status_roundtrips_through_str() {
        for status in [TaskStatus::Todo, TaskStatus::Wip, TaskStatus::Done] {
            assert_eq!(status.to_string().parse::<TaskStatus>().unwrap(), status);
        }
    }

    #[test]
    fn task_json_uses_camel_case() {
        let task = Task::new(3, "Write report");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dayIndex"], 3);
        assert_eq!(json["status"], "todo");
        assert!(json["chunks"].as_array().unwrap().is_empty());
    }

    #[test]
    fn numeric_ids_are_read_as_strings() {
        let chunk: Chunk =
            serde_json::from_str(r#"{"id":1700000000123,"text":"outline","done":false}"#).unwrap();
        assert_eq!(chunk.id, "1700000000123");
    }

    #[test]
    fn legacy_task_without_timestamps_deserializes() {
        let task: Task = serde_json::from_str(
            r#"{"id":"1700000000000","dayIndex":1,"content":"x","status":"wip","chunks":[{"id":"c","text":"a","done":true}]}"#,
        )
        .unwrap();
        assert_eq!(task.status, TaskStatus::Wip);
        assert_eq!(task.chunk_progress(), (1, 1));
    }
}
