use crate::types::enums::{Difficulty, Priority, TaskStatus};
use crate::types::ids::{CommentId, SubtaskId, TaskId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub difficulty: Difficulty,
    pub status: TaskStatus,
    pub due_at: DateTime<Utc>,
    pub creator_id: UserId,
    pub assignee_id: Option<UserId>,
    pub parent_id: Option<TaskId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creator and assignee are the users a task counts towards.
    pub fn involves(&self, user_id: &UserId) -> bool {
        self.creator_id == *user_id || self.assignee_id.as_ref() == Some(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: SubtaskId,
    pub task_id: TaskId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    pub author_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetail {
    pub task: Task,
    pub subtasks: Vec<Subtask>,
    pub comments: Vec<Comment>,
    pub dependents: Vec<Task>,
}
