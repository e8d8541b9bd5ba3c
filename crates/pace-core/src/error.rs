use crate::types::enums::TaskStatus;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task not found")]
    NotFound,
    #[error("subtask not found")]
    SubtaskNotFound,
    #[error("comment not found")]
    CommentNotFound,
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },
    #[error("cycle detected")]
    CycleDetected,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("storage error: {message}")]
    Storage { message: String },
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error("username already taken: {username}")]
    NameConflict { username: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("storage error: {message}")]
    Storage { message: String },
}

#[derive(Debug, Error)]
pub enum KpiError {
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to parse config: {message}")]
    Parse { message: String },
    #[error("invalid config: {message}")]
    Invalid { message: String },
}

/// The four classes every failure is reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Storage,
    Authorization,
}

#[derive(Debug, Error)]
pub enum PaceError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Kpi(#[from] KpiError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not authorized: {message}")]
    Unauthorized { message: String },
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl PaceError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Task(task) => match task {
                TaskError::NotFound | TaskError::SubtaskNotFound | TaskError::CommentNotFound => {
                    ErrorKind::NotFound
                }
                TaskError::InvalidTransition { .. }
                | TaskError::CycleDetected
                | TaskError::InvalidInput { .. } => ErrorKind::Validation,
                TaskError::Storage { .. } => ErrorKind::Storage,
            },
            Self::User(user) => match user {
                UserError::NotFound => ErrorKind::NotFound,
                UserError::NameConflict { .. } | UserError::InvalidInput { .. } => {
                    ErrorKind::Validation
                }
                UserError::Storage { .. } => ErrorKind::Storage,
            },
            Self::Kpi(_) | Self::Config(_) => ErrorKind::Validation,
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::Storage { .. } => ErrorKind::Storage,
        }
    }
}
