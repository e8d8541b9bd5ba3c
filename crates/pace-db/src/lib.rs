pub mod comment_repo;
pub mod schema;
pub mod store;
pub mod subtask_repo;
pub mod task_repo;
pub mod user_repo;
pub mod util;

pub use crate::store::DbStore;
