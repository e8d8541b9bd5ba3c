//! Task selection per scope, fed into the scoring engine.
//!
//! Callers are expected to have authorized the scope already.

use crate::error::{PaceError, UserError};
use crate::scoring::ScoringEngine;
use crate::store::Store;
use crate::tasks::TaskRepository;
use crate::types::{DateRange, ScoreBreakdown, Task, TaskFilter, UserId, UserScore};
use crate::users::UserRepository;
use chrono::{DateTime, Utc};

pub struct Aggregator<'a, S: Store> {
    store: &'a S,
    engine: &'a ScoringEngine,
}

impl<'a, S: Store> Aggregator<'a, S> {
    pub fn new(store: &'a S, engine: &'a ScoringEngine) -> Self {
        Self { store, engine }
    }

    /// Tasks the user created or is assigned to, optionally limited to a
    /// due-date range.
    pub fn individual_tasks(
        &self,
        user_id: &UserId,
        range: Option<DateRange>,
    ) -> Result<Vec<Task>, PaceError> {
        if self.store.users().get(user_id)?.is_none() {
            return Err(UserError::NotFound.into());
        }
        let filter = TaskFilter::involving(user_id).within(range);
        Ok(self.store.tasks().list(&filter)?)
    }

    pub fn organization_tasks(&self, range: Option<DateRange>) -> Result<Vec<Task>, PaceError> {
        let filter = TaskFilter::default().within(range);
        Ok(self.store.tasks().list(&filter)?)
    }

    pub fn individual_kpi(
        &self,
        user_id: &UserId,
        range: Option<DateRange>,
        now: DateTime<Utc>,
    ) -> Result<ScoreBreakdown, PaceError> {
        let tasks = self.individual_tasks(user_id, range)?;
        Ok(self.engine.breakdown(&tasks, now))
    }

    pub fn organization_kpi(
        &self,
        range: Option<DateRange>,
        now: DateTime<Utc>,
    ) -> Result<ScoreBreakdown, PaceError> {
        let tasks = self.organization_tasks(range)?;
        Ok(self.engine.breakdown(&tasks, now))
    }

    /// One score per known user, in ascending user id order.
    pub fn per_user_breakdown(
        &self,
        range: DateRange,
        now: DateTime<Utc>,
    ) -> Result<Vec<UserScore>, PaceError> {
        let mut users = self.store.users().list()?;
        users.sort_by(|a, b| a.id.cmp(&b.id));
        let mut scores = Vec::with_capacity(users.len());
        for user in users {
            let filter = TaskFilter::involving(&user.id).within(Some(range));
            let tasks = self.store.tasks().list(&filter)?;
            scores.push(UserScore {
                user_id: user.id,
                username: user.username,
                score: self.engine.score(&tasks, now),
            });
        }
        Ok(scores)
    }
}
