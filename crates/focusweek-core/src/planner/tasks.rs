use super::{check_day, new_id, Chunk, Task, TaskStatus, MAX_TASKS_PER_DAY};
use crate::error::ValidationError;

/// Ordered task list for the week.
///
/// Tasks are kept in one flat list; the order of a day's tasks is their
/// relative order in that list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap tasks loaded from storage. Order is preserved as stored.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn for_day(&self, day: u8) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.day_index == day).collect()
    }

    pub fn count_for_day(&self, day: u8) -> usize {
        self.tasks.iter().filter(|t| t.day_index == day).count()
    }

    pub fn is_day_full(&self, day: u8) -> bool {
        self.count_for_day(day) >= MAX_TASKS_PER_DAY
    }

    /// Add an empty `todo` task at the end of `day`.
    pub fn add(&mut self, day: u8) -> Result<Task, ValidationError> {
        self.add_with_content(day, "")
    }

    pub fn add_with_content(&mut self, day: u8, content: &str) -> Result<Task, ValidationError> {
        let day = check_day(day)?;
        if self.is_day_full(day) {
            return Err(ValidationError::DayFull {
                day,
                max: MAX_TASKS_PER_DAY,
            });
        }
        let task = Task::new(day, content.trim());
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn set_content(&mut self, id: &str, content: &str) -> Result<(), ValidationError> {
        self.get_mut(id)?.content = content.to_string();
        Ok(())
    }

    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> Result<(), ValidationError> {
        self.get_mut(id)?.status = status;
        Ok(())
    }

    /// Flip between `done` and `todo`. A `wip` task becomes `done`.
    pub fn toggle_done(&mut self, id: &str) -> Result<TaskStatus, ValidationError> {
        let task = self.get_mut(id)?;
        task.status = if task.is_done() {
            TaskStatus::Todo
        } else {
            TaskStatus::Done
        };
        Ok(task.status)
    }

    pub fn remove(&mut self, id: &str) -> Result<Task, ValidationError> {
        let index = self.index_of(id)?;
        Ok(self.tasks.remove(index))
    }

    /// Move a task to `day` at `position` among that day's tasks (appended
    /// when `None` or past the end).
    ///
    /// Moving into a full day is rejected; reordering inside the task's
    /// own day is always allowed.
    pub fn move_to(
        &mut self,
        id: &str,
        day: u8,
        position: Option<usize>,
    ) -> Result<(), ValidationError> {
        let day = check_day(day)?;
        let index = self.index_of(id)?;
        if self.tasks[index].day_index != day && self.is_day_full(day) {
            return Err(ValidationError::DayFull {
                day,
                max: MAX_TASKS_PER_DAY,
            });
        }

        let mut task = self.tasks.remove(index);
        task.day_index = day;

        let slots: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.day_index == day)
            .map(|(i, _)| i)
            .collect();
        let insert_at = match position {
            Some(p) if p < slots.len() => slots[p],
            _ => slots.last().map(|&i| i + 1).unwrap_or(self.tasks.len()),
        };
        self.tasks.insert(insert_at, task);
        Ok(())
    }

    // ── Chunks ───────────────────────────────────────────────────────

    pub fn add_chunk(&mut self, task_id: &str, text: &str) -> Result<Chunk, ValidationError> {
        let chunk = Chunk {
            id: new_id(),
            text: text.trim().to_string(),
            done: false,
        };
        self.get_mut(task_id)?.chunks.push(chunk.clone());
        Ok(chunk)
    }

    pub fn set_chunk_text(
        &mut self,
        task_id: &str,
        chunk_id: &str,
        text: &str,
    ) -> Result<(), ValidationError> {
        self.chunk_mut(task_id, chunk_id)?.text = text.to_string();
        Ok(())
    }

    /// Flip a chunk's `done` flag and return the new value.
    pub fn toggle_chunk(&mut self, task_id: &str, chunk_id: &str) -> Result<bool, ValidationError> {
        let chunk = self.chunk_mut(task_id, chunk_id)?;
        chunk.done = !chunk.done;
        Ok(chunk.done)
    }

    pub fn remove_chunk(&mut self, task_id: &str, chunk_id: &str) -> Result<Chunk, ValidationError> {
        let task = self.get_mut(task_id)?;
        let index = task
            .chunks
            .iter()
            .position(|c| c.id == chunk_id)
            .ok_or_else(|| ValidationError::ChunkNotFound {
                task_id: task_id.to_string(),
                chunk_id: chunk_id.to_string(),
            })?;
        Ok(task.chunks.remove(index))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn index_of(&self, id: &str) -> Result<usize, ValidationError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ValidationError::TaskNotFound(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Task, ValidationError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ValidationError::TaskNotFound(id.to_string()))
    }

    fn chunk_mut(&mut self, task_id: &str, chunk_id: &str) -> Result<&mut Chunk, ValidationError> {
        self.get_mut(task_id)?
            .chunks
            .iter_mut()
            .find(|c| c.id == chunk_id)
            .ok_or_else(|| ValidationError::ChunkNotFound {
                task_id: task_id.to_string(),
                chunk_id: chunk_id.to_string(),
            })
    }
}
