use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{deserialize_id, new_id};
use crate::error::ValidationError;

/// A thought parked during a focus session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub text: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Notes list, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteStore {
    notes: Vec<Note>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_notes(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Prepend a note. Surrounding whitespace is trimmed and blank input
    /// is rejected.
    pub fn add(&mut self, text: &str) -> Result<Note, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyNote);
        }
        let note = Note {
            id: new_id(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        self.notes.insert(0, note.clone());
        Ok(note)
    }

    pub fn remove(&mut self, id: &str) -> Result<Note, ValidationError> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| ValidationError::NoteNotFound(id.to_string()))?;
        Ok(self.notes.remove(index))
    }

    /// Drop every note and return how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.notes.len();
        self.notes.clear();
        count
    }
}
