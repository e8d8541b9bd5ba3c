use crate::error::TaskError;
use crate::types::{CreateSubtaskInput, Subtask, SubtaskId, TaskId, UpdateSubtaskInput};

pub trait SubtaskRepository {
    fn create(&self, input: CreateSubtaskInput) -> Result<Subtask, TaskError>;
    fn get(&self, id: &SubtaskId) -> Result<Option<Subtask>, TaskError>;
    fn list(&self, task_id: &TaskId) -> Result<Vec<Subtask>, TaskError>;
    fn update(&self, id: &SubtaskId, input: UpdateSubtaskInput) -> Result<Subtask, TaskError>;
    fn delete(&self, id: &SubtaskId) -> Result<(), TaskError>;
}
