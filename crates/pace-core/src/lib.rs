pub mod aggregate;
pub mod clock;
pub mod comments;
pub mod config;
pub mod deadlines;
pub mod error;
pub mod pace;
pub mod scoring;
pub mod store;
pub mod subtasks;
pub mod tasks;
pub mod users;
pub mod validation;

pub mod types;

pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::config::PaceConfig;
pub use crate::error::{ErrorKind, PaceError};
pub use crate::pace::Pace;
pub use crate::scoring::ScoringEngine;
pub use crate::store::Store;
