use crate::util::{decode_id, from_rfc3339, task_storage, to_rfc3339};
use chrono::{DateTime, Utc};
use pace_core::comments::CommentRepository;
use pace_core::error::TaskError;
use pace_core::types::{Comment, CommentId, CreateCommentInput, TaskId};
use rusqlite::{Connection, OptionalExtension, params};

pub struct CommentRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> CommentRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl<'a> CommentRepository for CommentRepo<'a> {
    fn add(&self, input: CreateCommentInput, now: DateTime<Utc>) -> Result<Comment, TaskError> {
        let comment = Comment {
            id: CommentId::generate(),
            task_id: input.task_id,
            author_id: input.author_id,
            body: input.body,
            created_at: now,
        };
        self.conn
            .execute(
                "INSERT INTO task_comments (id, task_id, author_id, body, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    comment.id.as_str(),
                    comment.task_id.as_str(),
                    comment.author_id.as_str(),
                    comment.body,
                    to_rfc3339(&comment.created_at),
                ],
            )
            .map_err(task_storage)?;
        Ok(comment)
    }

    fn get(&self, id: &CommentId) -> Result<Option<Comment>, TaskError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, task_id, author_id, body, created_at FROM task_comments WHERE id = ?1",
                [id.as_str()],
                read_comment_row,
            )
            .optional()
            .map_err(task_storage)?;
        row.map(decode_comment_row).transpose()
    }

    fn list(&self, task_id: &TaskId) -> Result<Vec<Comment>, TaskError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, task_id, author_id, body, created_at FROM task_comments WHERE task_id = ?1 ORDER BY created_at ASC, id ASC")
            .map_err(task_storage)?;
        let rows = stmt
            .query_map([task_id.as_str()], read_comment_row)
            .map_err(task_storage)?;
        let mut comments = Vec::new();
        for row in rows {
            comments.push(decode_comment_row(row.map_err(task_storage)?)?);
        }
        Ok(comments)
    }

    fn update(&self, id: &CommentId, body: &str) -> Result<Comment, TaskError> {
        let affected = self
            .conn
            .execute(
                "UPDATE task_comments SET body = ?1 WHERE id = ?2",
                params![body, id.as_str()],
            )
            .map_err(task_storage)?;
        if affected == 0 {
            return Err(TaskError::CommentNotFound);
        }
        self.get(id)?.ok_or(TaskError::CommentNotFound)
    }

    fn delete(&self, id: &CommentId) -> Result<(), TaskError> {
        let affected = self
            .conn
            .execute("DELETE FROM task_comments WHERE id = ?1", [id.as_str()])
            .map_err(task_storage)?;
        if affected == 0 {
            return Err(TaskError::CommentNotFound);
        }
        Ok(())
    }
}

type CommentRow = (String, String, String, String, String);

fn read_comment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn decode_comment_row(row: CommentRow) -> Result<Comment, TaskError> {
    let (id, task_id, author_id, body, created_at) = row;
    Ok(Comment {
        id: decode_id(id).map_err(task_storage)?,
        task_id: decode_id(task_id).map_err(task_storage)?,
        author_id: decode_id(author_id).map_err(task_storage)?,
        body,
        created_at: from_rfc3339(&created_at).map_err(task_storage)?,
    })
}
