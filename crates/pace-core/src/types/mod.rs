pub mod enums;
pub mod ids;
pub mod io;
pub mod kpi;
pub mod task;
pub mod user;

pub use enums::{Difficulty, ParseEnumError, Priority, Role, TaskStatus};
pub use ids::{CommentId, IdError, SubtaskId, TaskId, UserId};
pub use io::{
    CreateCommentInput, CreateSubtaskInput, CreateTaskInput, CreateUserInput, TaskFilter,
    UpdateSubtaskInput, UpdateTaskInput,
};
pub use kpi::{DateRange, Score, ScopedKpi, ScoreBreakdown, UserScore};
pub use task::{Comment, Subtask, Task, TaskDetail};
pub use user::{Actor, User};
