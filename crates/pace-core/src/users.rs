use crate::error::UserError;
use crate::types::{CreateUserInput, User, UserId};
use chrono::{DateTime, Utc};

pub trait UserRepository {
    fn create(&self, input: CreateUserInput, now: DateTime<Utc>) -> Result<User, UserError>;
    fn get(&self, id: &UserId) -> Result<Option<User>, UserError>;
    fn get_by_name(&self, username: &str) -> Result<Option<User>, UserError>;
    /// All users in ascending id order.
    fn list(&self) -> Result<Vec<User>, UserError>;
}
