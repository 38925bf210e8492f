//! Task list with per-task pomodoro counts.
//!
//! Tasks are a lightweight planning aid next to the timer: each one carries
//! an estimate in pomodoros and a count of completed ones. The list is
//! persisted whole under the `tasks` key in the same wire format as the rest
//! of the collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StoreError, TaskError};
use crate::storage::{keys, Store};

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// One task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub estimated_pomodoros: u32,
    pub completed_pomodoros: u32,
    pub priority: TaskPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Task {
    /// Creates an open task with default values; adjust the public fields
    /// before adding it to a list.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Task {
            id: format!("task-{}-{}", now.timestamp(), Uuid::new_v4()),
            title: title.into(),
            description: None,
            completed: false,
            created_at: now,
            completed_at: None,
            estimated_pomodoros: 1,
            completed_pomodoros: 0,
            priority: TaskPriority::Medium,
            category: None,
        }
    }
}

/// Ordered task collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))
    }

    /// Appends a task and returns a reference to it.
    pub fn add(&mut self, task: Task) -> &Task {
        self.tasks.push(task);
        // push guarantees a last element
        &self.tasks[self.tasks.len() - 1]
    }

    /// Flips a task between open and completed.
    ///
    /// Completing stamps `completed_at`; reopening clears it.
    pub fn toggle(&mut self, id: &str, now: DateTime<Utc>) -> Result<&Task, TaskError> {
        let task = self.find_mut(id)?;
        task.completed = !task.completed;
        task.completed_at = task.completed.then_some(now);
        Ok(task)
    }

    /// Removes a task, returning it.
    pub fn remove(&mut self, id: &str) -> Result<Task, TaskError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| TaskError::NotFound(id.to_string()))?;
        Ok(self.tasks.remove(index))
    }

    /// Credits one completed pomodoro to a task.
    pub fn increment_pomodoro(&mut self, id: &str) -> Result<&Task, TaskError> {
        let task = self.find_mut(id)?;
        task.completed_pomodoros += 1;
        Ok(task)
    }

    /// Hydrates the list from the store; missing or corrupted data yields an
    /// empty list.
    pub async fn load(store: &Store) -> Result<Self, StoreError> {
        let tasks = store.get_or_default(keys::TASKS).await?;
        Ok(Self { tasks })
    }

    /// Writes the whole list back to the store.
    pub async fn save(&self, store: &Store) -> Result<(), StoreError> {
        store.put(keys::TASKS, &self.tasks).await
    }
}
