use crate::types::enums::{Difficulty, Priority, Role, TaskStatus};
use crate::types::ids::{TaskId, UserId};
use crate::types::kpi::DateRange;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub difficulty: Difficulty,
    pub status: TaskStatus,
    pub due_at: DateTime<Utc>,
    pub creator_id: UserId,
    pub assignee_id: Option<UserId>,
    pub parent_id: Option<TaskId>,
}

/// Field edits. `Some(None)` clears an optional link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub difficulty: Option<Difficulty>,
    pub due_at: Option<DateTime<Utc>>,
    pub assignee_id: Option<Option<UserId>>,
    pub parent_id: Option<Option<TaskId>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub creator_id: Option<UserId>,
    pub assignee_id: Option<UserId>,
    /// Creator OR assignee.
    pub involving: Option<UserId>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub difficulty: Option<Difficulty>,
    /// Case-insensitive (ASCII) substring of the title.
    pub title_contains: Option<String>,
    pub parent_id: Option<TaskId>,
    pub due: Option<DateRange>,
}

impl TaskFilter {
    pub fn involving(user_id: &UserId) -> Self {
        Self {
            involving: Some(user_id.clone()),
            ..Self::default()
        }
    }

    pub fn with_status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn within(mut self, range: Option<DateRange>) -> Self {
        self.due = range;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubtaskInput {
    pub task_id: TaskId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSubtaskInput {
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCommentInput {
    pub task_id: TaskId,
    pub author_id: UserId,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserInput {
    pub username: String,
    pub role: Role,
}
