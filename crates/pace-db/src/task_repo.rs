use crate::util::{decode_enum, decode_id, from_rfc3339, task_storage, to_rfc3339};
use chrono::{DateTime, Utc};
use pace_core::error::TaskError;
use pace_core::tasks::TaskRepository;
use pace_core::types::{
    CreateTaskInput, Difficulty, Priority, Task, TaskFilter, TaskId, TaskStatus,
    UpdateTaskInput, UserId,
};
use rusqlite::{Connection, OptionalExtension, params};

const TASK_COLUMNS: &str = "id, title, description, priority, difficulty, status, due_at, creator_id, assignee_id, parent_id, created_at, updated_at, completed_at";

pub struct TaskRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> TaskRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> TaskRepository for TaskRepo<'a> {
    fn create(&self, input: CreateTaskInput, now: DateTime<Utc>) -> Result<Task, TaskError> {
        let task = Task {
            id: TaskId::generate(),
            title: input.title.trim().to_string(),
            description: input.description,
            priority: input.priority,
            difficulty: input.difficulty,
            status: input.status,
            due_at: input.due_at,
            creator_id: input.creator_id,
            assignee_id: input.assignee_id,
            parent_id: input.parent_id,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };

        let sql = format!(
            "INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        );
        self.conn
            .execute(
                &sql,
                params![
                    task.id.as_str(),
                    task.title,
                    task.description,
                    task.priority.as_str(),
                    task.difficulty.as_str(),
                    task.status.as_str(),
                    to_rfc3339(&task.due_at),
                    task.creator_id.as_str(),
                    task.assignee_id.as_ref().map(UserId::as_str),
                    task.parent_id.as_ref().map(TaskId::as_str),
                    to_rfc3339(&task.created_at),
                    to_rfc3339(&task.updated_at),
                    task.completed_at.as_ref().map(to_rfc3339),
                ],
            )
            .map_err(task_storage)?;

        Ok(task)
    }

    fn get(&self, id: &TaskId) -> Result<Option<Task>, TaskError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1");
        let row = self
            .conn
            .query_row(&sql, [id.as_str()], read_task_row)
            .optional()
            .map_err(task_storage)?;
        row.map(decode_task_row).transpose()
    }

    fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, TaskError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE (?1 IS NULL OR creator_id = ?1)
               AND (?2 IS NULL OR assignee_id = ?2)
               AND (?3 IS NULL OR creator_id = ?3 OR assignee_id = ?3)
               AND (?4 IS NULL OR status = ?4)
               AND (?5 IS NULL OR parent_id = ?5)
               AND (?6 IS NULL OR due_at >= ?6)
               AND (?7 IS NULL OR due_at <= ?7)
               AND (?8 IS NULL OR priority = ?8)
               AND (?9 IS NULL OR difficulty = ?9)
               AND (?10 IS NULL OR title LIKE '%' || ?10 || '%' ESCAPE '\\')
             ORDER BY due_at ASC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(task_storage)?;
        let rows = stmt
            .query_map(
                params![
                    filter.creator_id.as_ref().map(UserId::as_str),
                    filter.assignee_id.as_ref().map(UserId::as_str),
                    filter.involving.as_ref().map(UserId::as_str),
                    filter.status.map(TaskStatus::as_str),
                    filter.parent_id.as_ref().map(TaskId::as_str),
                    filter.due.map(|range| to_rfc3339(&range.start_at())),
                    filter.due.map(|range| to_rfc3339(&range.end_at())),
                    filter.priority.as_ref().map(Priority::as_str),
                    filter.difficulty.as_ref().map(Difficulty::as_str),
                    filter.title_contains.as_deref().map(escape_like),
                ],
                read_task_row,
            )
            .map_err(task_storage)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(decode_task_row(row.map_err(task_storage)?)?);
        }
        Ok(tasks)
    }

    fn update(
        &self,
        id: &TaskId,
        input: UpdateTaskInput,
        now: DateTime<Utc>,
    ) -> Result<Task, TaskError> {
        let mut task = self.get(id)?.ok_or(TaskError::NotFound)?;
        if let Some(title) = input.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = input.description {
            task.description = description;
        }
        if let Some(priority) = input.priority {
            task.priority = priority;
        }
        if let Some(difficulty) = input.difficulty {
            task.difficulty = difficulty;
        }
        if let Some(due_at) = input.due_at {
            task.due_at = due_at;
        }
        if let Some(assignee_id) = input.assignee_id {
            task.assignee_id = assignee_id;
        }
        if let Some(parent_id) = input.parent_id {
            task.parent_id = parent_id;
        }
        task.updated_at = now;

        self.conn
            .execute(
                "UPDATE tasks SET title = ?1, description = ?2, priority = ?3, difficulty = ?4, due_at = ?5, assignee_id = ?6, parent_id = ?7, updated_at = ?8 WHERE id = ?9",
                params![
                    task.title,
                    task.description,
                    task.priority.as_str(),
                    task.difficulty.as_str(),
                    to_rfc3339(&task.due_at),
                    task.assignee_id.as_ref().map(UserId::as_str),
                    task.parent_id.as_ref().map(TaskId::as_str),
                    to_rfc3339(&task.updated_at),
                    task.id.as_str(),
                ],
            )
            .map_err(task_storage)?;
        Ok(task)
    }

    fn set_status(
        &self,
        id: &TaskId,
        status: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Task, TaskError> {
        let affected = self
            .conn
            .execute(
                "UPDATE tasks SET status = ?1, completed_at = ?2, updated_at = ?3 WHERE id = ?4",
                params![
                    status.as_str(),
                    completed_at.as_ref().map(to_rfc3339),
                    to_rfc3339(&now),
                    id.as_str(),
                ],
            )
            .map_err(task_storage)?;
        if affected == 0 {
            return Err(TaskError::NotFound);
        }
        self.get(id)?.ok_or(TaskError::NotFound)
    }

    fn mark_overdue(&self, id: &TaskId, now: DateTime<Utc>) -> Result<bool, TaskError> {
        let affected = self
            .conn
            .execute(
                "UPDATE tasks SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
                params![
                    TaskStatus::Overdue.as_str(),
                    to_rfc3339(&now),
                    id.as_str(),
                    TaskStatus::InProgress.as_str(),
                ],
            )
            .map_err(task_storage)?;
        Ok(affected > 0)
    }

    fn delete(&self, id: &TaskId) -> Result<(), TaskError> {
        let affected = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", [id.as_str()])
            .map_err(task_storage)?;
        if affected == 0 {
            return Err(TaskError::NotFound);
        }
        Ok(())
    }
}

/// Makes `%` and `_` literal for a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

struct TaskRow {
    id: String,
    title: String,
    description: String,
    priority: String,
    difficulty: String,
    status: String,
    due_at: String,
    creator_id: String,
    assignee_id: Option<String>,
    parent_id: Option<String>,
    created_at: String,
    updated_at: String,
    completed_at: Option<String>,
}

fn read_task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        priority: row.get(3)?,
        difficulty: row.get(4)?,
        status: row.get(5)?,
        due_at: row.get(6)?,
        creator_id: row.get(7)?,
        assignee_id: row.get(8)?,
        parent_id: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
        completed_at: row.get(12)?,
    })
}

fn decode_task_row(row: TaskRow) -> Result<Task, TaskError> {
    let completed_at = row
        .completed_at
        .as_deref()
        .map(from_rfc3339)
        .transpose()
        .map_err(task_storage)?;

    Ok(Task {
        id: decode_id(row.id).map_err(task_storage)?,
        title: row.title,
        description: row.description,
        priority: Priority::from_stored(&row.priority),
        difficulty: Difficulty::from_stored(&row.difficulty),
        status: decode_enum(&row.status).map_err(task_storage)?,
        due_at: from_rfc3339(&row.due_at).map_err(task_storage)?,
        creator_id: decode_id(row.creator_id).map_err(task_storage)?,
        assignee_id: row
            .assignee_id
            .map(decode_id)
            .transpose()
            .map_err(task_storage)?,
        parent_id: row
            .parent_id
            .map(decode_id)
            .transpose()
            .map_err(task_storage)?,
        created_at: from_rfc3339(&row.created_at).map_err(task_storage)?,
        updated_at: from_rfc3339(&row.updated_at).map_err(task_storage)?,
        completed_at,
    })
}
