use pace_core::error::PaceError;
use pace_core::store::Store;
use rusqlite::Connection;

use crate::comment_repo::CommentRepo;
use crate::subtask_repo::SubtaskRepo;
use crate::task_repo::TaskRepo;
use crate::user_repo::UserRepo;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn storage(err: rusqlite::Error) -> PaceError {
    PaceError::Storage {
        message: err.to_string(),
    }
}

impl Store for DbStore {
    type Tasks<'a>
        = TaskRepo<'a>
    where
        Self: 'a;
    type Subtasks<'a>
        = SubtaskRepo<'a>
    where
        Self: 'a;
    type Comments<'a>
        = CommentRepo<'a>
    where
        Self: 'a;
    type Users<'a>
        = UserRepo<'a>
    where
        Self: 'a;

    fn tasks(&self) -> Self::Tasks<'_> {
        TaskRepo::new(&self.conn)
    }

    fn subtasks(&self) -> Self::Subtasks<'_> {
        SubtaskRepo::new(&self.conn)
    }

    fn comments(&self) -> Self::Comments<'_> {
        CommentRepo::new(&self.conn)
    }

    fn users(&self) -> Self::Users<'_> {
        UserRepo::new(&self.conn)
    }

    fn with_tx<F, T>(&self, f: F) -> Result<T, PaceError>
    where
        F: FnOnce(&Self) -> Result<T, PaceError>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE").map_err(storage)?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT").map_err(storage)?;
                Ok(value)
            }
            Err(err) => {
                self.conn.execute_batch("ROLLBACK").map_err(storage)?;
                tracing::debug!(error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }
}
