pub mod comment;
pub mod kpi;
pub mod subtask;
pub mod task;
pub mod user;

use crate::error::CliError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::Args;
use pace_core::error::PaceError;
use pace_core::types::{Actor, DateRange, UserId};
use pace_core::{Pace, SystemClock};
use pace_db::DbStore;

pub type App = Pace<DbStore, SystemClock>;

pub struct Context<'a> {
    pub app: &'a App,
    acting: Option<&'a str>,
}

impl<'a> Context<'a> {
    pub fn new(app: &'a App, acting: Option<&'a str>) -> Self {
        Self { app, acting }
    }

    pub fn actor(&self) -> Result<Actor, CliError> {
        let username = self.acting.ok_or(CliError::NoActor)?;
        let user = self.app.users().by_name(username)?;
        Ok(Actor::from(&user))
    }

    pub fn user_id(&self, username: &str) -> Result<UserId, CliError> {
        Ok(self.app.users().by_name(username)?.id)
    }

    /// Resolves `username` for a view only admins may take of other users.
    /// Members are turned away before the directory is consulted.
    pub fn scoped_user(&self, actor: &Actor, username: &str) -> Result<UserId, CliError> {
        if self.acting == Some(username) {
            return Ok(actor.user_id.clone());
        }
        if !actor.is_admin() {
            tracing::warn!(user = %actor.user_id, target = username, "request rejected");
            return Err(PaceError::unauthorized("viewing another user's KPI requires admin").into());
        }
        self.user_id(username)
    }
}

/// Due dates accept RFC 3339, `YYYY-MM-DDTHH:MM` (UTC) or a bare day, which
/// means the end of that day.
pub fn parse_due(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed.and_utc());
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        return Ok(day.and_time(end_of_day).and_utc());
    }
    Err(format!(
        "invalid due date '{value}': expected YYYY-MM-DD, YYYY-MM-DDTHH:MM or RFC 3339"
    ))
}

pub fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{value}': expected YYYY-MM-DD"))
}

/// Optional due-date window; both ends or neither.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First day, inclusive (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    pub from: Option<String>,
    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

impl RangeArgs {
    pub fn range(&self) -> Result<Option<DateRange>, CliError> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => Ok(Some(DateRange::parse(from, to).map_err(PaceError::from)?)),
            _ => Ok(None),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct PeriodArgs {
    /// First day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub from: String,
    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: String,
}

impl PeriodArgs {
    pub fn range(&self) -> Result<DateRange, CliError> {
        Ok(DateRange::parse(&self.from, &self.to).map_err(PaceError::from)?)
    }
}
