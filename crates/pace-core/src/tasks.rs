use crate::error::TaskError;
use crate::types::{CreateTaskInput, Task, TaskFilter, TaskId, TaskStatus, UpdateTaskInput};
use chrono::{DateTime, Utc};

pub trait TaskRepository {
    fn create(&self, input: CreateTaskInput, now: DateTime<Utc>) -> Result<Task, TaskError>;
    fn get(&self, id: &TaskId) -> Result<Option<Task>, TaskError>;
    /// Matching tasks ordered by due date, then id.
    fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, TaskError>;
    fn update(
        &self,
        id: &TaskId,
        input: UpdateTaskInput,
        now: DateTime<Utc>,
    ) -> Result<Task, TaskError>;
    /// Writes `status` and `completed_at` exactly as given.
    fn set_status(
        &self,
        id: &TaskId,
        status: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Task, TaskError>;
    /// InProgress -> Overdue, guarded on the current status. Returns whether
    /// a row changed.
    fn mark_overdue(&self, id: &TaskId, now: DateTime<Utc>) -> Result<bool, TaskError>;
    /// Removes the task with its subtasks and comments; dependents are
    /// unlinked.
    fn delete(&self, id: &TaskId) -> Result<(), TaskError>;
}
