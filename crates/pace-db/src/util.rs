use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use pace_core::error::{TaskError, UserError};
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid enum value: {value}")]
    InvalidEnum { value: String },
    #[error("invalid timestamp: {value}")]
    InvalidTimestamp { value: String },
    #[error("invalid date: {value}")]
    InvalidDate { value: String },
    #[error("invalid id: {value}")]
    InvalidId { value: String },
}

/// Fixed width with millisecond precision and a `Z` suffix, so stored
/// timestamps order the same way lexically and chronologically.
pub fn to_rfc3339(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn from_rfc3339(value: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DbError::InvalidTimestamp {
            value: value.to_string(),
        })
}

pub fn to_day(value: &NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub fn from_day(value: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| DbError::InvalidDate {
        value: value.to_string(),
    })
}

pub fn decode_id<T: std::str::FromStr>(value: String) -> Result<T, DbError> {
    value.parse().map_err(|_| DbError::InvalidId { value })
}

pub fn decode_enum<T: std::str::FromStr>(value: &str) -> Result<T, DbError> {
    value.parse().map_err(|_| DbError::InvalidEnum {
        value: value.to_string(),
    })
}

pub fn task_storage(err: impl Display) -> TaskError {
    TaskError::Storage {
        message: err.to_string(),
    }
}

pub fn user_storage(err: impl Display) -> UserError {
    UserError::Storage {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_timestamps_sort_chronologically() {
        let early: DateTime<Utc> = "2024-06-09T23:59:59.999Z".parse().unwrap();
        let late: DateTime<Utc> = "2024-06-10T00:00:00Z".parse().unwrap();
        let (a, b) = (to_rfc3339(&early), to_rfc3339(&late));
        assert_eq!(b, "2024-06-10T00:00:00.000Z");
        assert!(a < b);
        assert_eq!(from_rfc3339(&b).unwrap(), late);
    }

    #[test]
    fn foreign_offsets_are_normalized() {
        let parsed = from_rfc3339("2024-06-10T03:00:00+03:00").unwrap();
        assert_eq!(to_rfc3339(&parsed), "2024-06-10T00:00:00.000Z");
    }
}
