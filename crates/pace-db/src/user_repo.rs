use crate::util::{decode_enum, decode_id, from_rfc3339, to_rfc3339, user_storage};
use chrono::{DateTime, Utc};
use pace_core::error::UserError;
use pace_core::types::{CreateUserInput, User, UserId};
use pace_core::users::UserRepository;
use rusqlite::{Connection, OptionalExtension, params};

pub struct UserRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> UserRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn find(&self, column: &str, value: &str) -> Result<Option<User>, UserError> {
        let sql = format!("SELECT id, username, role, created_at FROM users WHERE {column} = ?1");
        let row = self
            .conn
            .query_row(&sql, [value], read_user_row)
            .optional()
            .map_err(user_storage)?;
        row.map(decode_user_row).transpose()
    }
}

impl<'a> UserRepository for UserRepo<'a> {
    fn create(&self, input: CreateUserInput, now: DateTime<Utc>) -> Result<User, UserError> {
        let user = User {
            id: UserId::generate(),
            username: input.username,
            role: input.role,
            created_at: now,
        };
        self.conn
            .execute(
                "INSERT INTO users (id, username, role, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    user.id.as_str(),
                    user.username,
                    user.role.as_str(),
                    to_rfc3339(&user.created_at),
                ],
            )
            .map_err(|err| match err.sqlite_error_code() {
                Some(rusqlite::ErrorCode::ConstraintViolation) => UserError::NameConflict {
                    username: user.username.clone(),
                },
                _ => user_storage(err),
            })?;
        Ok(user)
    }

    fn get(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.find("id", id.as_str())
    }

    fn get_by_name(&self, username: &str) -> Result<Option<User>, UserError> {
        self.find("username", username)
    }

    fn list(&self) -> Result<Vec<User>, UserError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username, role, created_at FROM users ORDER BY id ASC")
            .map_err(user_storage)?;
        let rows = stmt.query_map([], read_user_row).map_err(user_storage)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(decode_user_row(row.map_err(user_storage)?)?);
        }
        Ok(users)
    }
}

type UserRow = (String, String, String, String);

fn read_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_user_row(row: UserRow) -> Result<User, UserError> {
    let (id, username, role, created_at) = row;
    Ok(User {
        id: decode_id(id).map_err(user_storage)?,
        username,
        role: decode_enum(&role).map_err(user_storage)?,
        created_at: from_rfc3339(&created_at).map_err(user_storage)?,
    })
}
