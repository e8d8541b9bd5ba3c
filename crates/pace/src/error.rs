use pace_core::error::{ConfigError, ErrorKind, PaceError};
use pace_report::ReportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pace(#[from] PaceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("no acting user; pass --as <username> or set PACE_USER")]
    NoActor,
    #[error("already initialized: the user directory is not empty")]
    AlreadyInitialized,
    #[error("database error: {message}")]
    Database { message: String },
    #[error("failed to write {path}: {message}")]
    Io { path: String, message: String },
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Pace(err) => err.kind(),
            Self::Config(_) | Self::AlreadyInitialized => ErrorKind::Validation,
            Self::NoActor => ErrorKind::Authorization,
            Self::Report(_) | Self::Database { .. } | Self::Io { .. } | Self::Json(_) => {
                ErrorKind::Storage
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Validation => 2,
            ErrorKind::NotFound => 3,
            ErrorKind::Authorization => 4,
            ErrorKind::Storage => 5,
        }
    }
}
