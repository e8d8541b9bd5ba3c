use crate::comments::CommentRepository;
use crate::error::PaceError;
use crate::subtasks::SubtaskRepository;
use crate::tasks::TaskRepository;
use crate::users::UserRepository;

pub trait Store {
    type Tasks<'a>: TaskRepository
    where
        Self: 'a;
    type Subtasks<'a>: SubtaskRepository
    where
        Self: 'a;
    type Comments<'a>: CommentRepository
    where
        Self: 'a;
    type Users<'a>: UserRepository
    where
        Self: 'a;

    fn tasks(&self) -> Self::Tasks<'_>;
    fn subtasks(&self) -> Self::Subtasks<'_>;
    fn comments(&self) -> Self::Comments<'_>;
    fn users(&self) -> Self::Users<'_>;

    /// Runs `f` atomically; any error rolls back every write made inside it.
    fn with_tx<F, T>(&self, f: F) -> Result<T, PaceError>
    where
        F: FnOnce(&Self) -> Result<T, PaceError>;
}
