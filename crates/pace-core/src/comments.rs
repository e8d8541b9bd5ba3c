use crate::error::TaskError;
use crate::types::{Comment, CommentId, CreateCommentInput, TaskId};
use chrono::{DateTime, Utc};

pub trait CommentRepository {
    fn add(&self, input: CreateCommentInput, now: DateTime<Utc>) -> Result<Comment, TaskError>;
    fn get(&self, id: &CommentId) -> Result<Option<Comment>, TaskError>;
    fn list(&self, task_id: &TaskId) -> Result<Vec<Comment>, TaskError>;
    fn update(&self, id: &CommentId, body: &str) -> Result<Comment, TaskError>;
    fn delete(&self, id: &CommentId) -> Result<(), TaskError>;
}
