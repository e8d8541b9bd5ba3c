use crate::util::{decode_id, from_day, task_storage, to_day};
use pace_core::error::TaskError;
use pace_core::subtasks::SubtaskRepository;
use pace_core::types::{CreateSubtaskInput, Subtask, SubtaskId, TaskId, UpdateSubtaskInput};
use rusqlite::{Connection, OptionalExtension, params};

pub struct SubtaskRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> SubtaskRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> SubtaskRepository for SubtaskRepo<'a> {
    fn create(&self, input: CreateSubtaskInput) -> Result<Subtask, TaskError> {
        let subtask = Subtask {
            id: SubtaskId::generate(),
            task_id: input.task_id,
            title: input.title.trim().to_string(),
            start_date: input.start_date,
            end_date: input.end_date,
        };
        self.conn
            .execute(
                "INSERT INTO subtasks (id, task_id, title, start_date, end_date) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    subtask.id.as_str(),
                    subtask.task_id.as_str(),
                    subtask.title,
                    to_day(&subtask.start_date),
                    to_day(&subtask.end_date),
                ],
            )
            .map_err(task_storage)?;
        Ok(subtask)
    }

    fn get(&self, id: &SubtaskId) -> Result<Option<Subtask>, TaskError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, task_id, title, start_date, end_date FROM subtasks WHERE id = ?1",
                [id.as_str()],
                read_subtask_row,
            )
            .optional()
            .map_err(task_storage)?;
        row.map(decode_subtask_row).transpose()
    }

    fn list(&self, task_id: &TaskId) -> Result<Vec<Subtask>, TaskError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, task_id, title, start_date, end_date FROM subtasks WHERE task_id = ?1 ORDER BY start_date ASC, id ASC")
            .map_err(task_storage)?;
        let rows = stmt
            .query_map([task_id.as_str()], read_subtask_row)
            .map_err(task_storage)?;
        let mut subtasks = Vec::new();
        for row in rows {
            subtasks.push(decode_subtask_row(row.map_err(task_storage)?)?);
        }
        Ok(subtasks)
    }

    fn update(&self, id: &SubtaskId, input: UpdateSubtaskInput) -> Result<Subtask, TaskError> {
        let mut subtask = self.get(id)?.ok_or(TaskError::SubtaskNotFound)?;
        if let Some(title) = input.title {
            subtask.title = title.trim().to_string();
        }
        if let Some(start_date) = input.start_date {
            subtask.start_date = start_date;
        }
        if let Some(end_date) = input.end_date {
            subtask.end_date = end_date;
        }
        self.conn
            .execute(
                "UPDATE subtasks SET title = ?1, start_date = ?2, end_date = ?3 WHERE id = ?4",
                params![
                    subtask.title,
                    to_day(&subtask.start_date),
                    to_day(&subtask.end_date),
                    subtask.id.as_str(),
                ],
            )
            .map_err(task_storage)?;
        Ok(subtask)
    }

    fn delete(&self, id: &SubtaskId) -> Result<(), TaskError> {
        let affected = self
            .conn
            .execute("DELETE FROM subtasks WHERE id = ?1", [id.as_str()])
            .map_err(task_storage)?;
        if affected == 0 {
            return Err(TaskError::SubtaskNotFound);
        }
        Ok(())
    }
}

type SubtaskRow = (String, String, String, String, String);

fn read_subtask_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubtaskRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn decode_subtask_row(row: SubtaskRow) -> Result<Subtask, TaskError> {
    let (id, task_id, title, start_date, end_date) = row;
    Ok(Subtask {
        id: decode_id(id).map_err(task_storage)?,
        task_id: decode_id(task_id).map_err(task_storage)?,
        title,
        start_date: from_day(&start_date).map_err(task_storage)?,
        end_date: from_day(&end_date).map_err(task_storage)?,
    })
}
