//! Deadline monitor: keeps task status in step with the clock and decides
//! which tasks deserve a "deadline approaching" notice.

use crate::error::PaceError;
use crate::store::Store;
use crate::tasks::TaskRepository;
use crate::types::{Task, TaskFilter, TaskId, TaskStatus, UserId};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub transitioned: Vec<TaskId>,
}

pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    task.status == TaskStatus::InProgress && task.due_at < now
}

/// In-progress tasks owned by `user_id` whose deadline is at most `horizon`
/// away. Tasks already past due but not yet reconciled qualify as well.
pub fn needs_warning(task: &Task, user_id: &UserId, now: DateTime<Utc>, horizon: TimeDelta) -> bool {
    task.creator_id == *user_id
        && task.status == TaskStatus::InProgress
        && task.due_at - now <= horizon
}

pub fn overdue_ids(tasks: &[Task], now: DateTime<Utc>) -> Vec<TaskId> {
    tasks
        .iter()
        .filter(|task| is_overdue(task, now))
        .map(|task| task.id.clone())
        .collect()
}

pub fn upcoming(tasks: &[Task], user_id: &UserId, now: DateTime<Utc>, horizon: TimeDelta) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| needs_warning(task, user_id, now, horizon))
        .cloned()
        .collect()
}

/// Moves every in-progress task whose deadline has passed to Overdue.
///
/// The pass runs in one transaction: either every qualifying task is
/// transitioned or, on a storage failure, none is and the error is returned.
pub fn reconcile<S: Store>(store: &S, now: DateTime<Utc>) -> Result<ReconcileReport, PaceError> {
    let report = store.with_tx(|store| {
        let candidates = store
            .tasks()
            .list(&TaskFilter::with_status(TaskStatus::InProgress))?;
        let mut transitioned = Vec::new();
        for id in overdue_ids(&candidates, now) {
            if store.tasks().mark_overdue(&id, now)? {
                transitioned.push(id);
            }
        }
        Ok(ReconcileReport { transitioned })
    })?;
    if !report.transitioned.is_empty() {
        tracing::info!(
            transitioned = report.transitioned.len(),
            now = %now,
            "reconciled deadlines"
        );
    }
    Ok(report)
}

pub fn upcoming_warnings<S: Store>(
    store: &S,
    user_id: &UserId,
    now: DateTime<Utc>,
    horizon: TimeDelta,
) -> Result<Vec<Task>, PaceError> {
    let filter = TaskFilter {
        creator_id: Some(user_id.clone()),
        status: Some(TaskStatus::InProgress),
        ..TaskFilter::default()
    };
    let tasks = store.tasks().list(&filter)?;
    Ok(upcoming(&tasks, user_id, now, horizon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Difficulty, Priority};

    fn at(value: &str) -> DateTime<Utc> {
        value.parse().unwrap()
    }

    fn task(owner: &UserId, status: TaskStatus, due: &str) -> Task {
        let created = at("2024-01-01T00:00:00Z");
        Task {
            id: TaskId::generate(),
            title: "Prepare audit".to_string(),
            description: String::new(),
            priority: Priority::Medium,
            difficulty: Difficulty::Medium,
            status,
            due_at: at(due),
            creator_id: owner.clone(),
            assignee_id: None,
            parent_id: None,
            created_at: created,
            updated_at: created,
            completed_at: None,
        }
    }

    #[test]
    fn only_in_progress_past_due_is_overdue() {
        let owner = UserId::generate();
        let now = at("2024-06-10T12:00:00Z");
        let tasks = vec![
            task(&owner, TaskStatus::InProgress, "2024-06-09T12:00:00Z"),
            task(&owner, TaskStatus::InProgress, "2024-06-11T12:00:00Z"),
            task(&owner, TaskStatus::Planned, "2024-06-01T12:00:00Z"),
            task(&owner, TaskStatus::Completed, "2024-06-01T12:00:00Z"),
            task(&owner, TaskStatus::Overdue, "2024-06-01T12:00:00Z"),
        ];
        assert_eq!(overdue_ids(&tasks, now), vec![tasks[0].id.clone()]);
    }

    #[test]
    fn due_exactly_now_is_not_yet_overdue() {
        let owner = UserId::generate();
        let now = at("2024-06-10T12:00:00Z");
        let t = task(&owner, TaskStatus::InProgress, "2024-06-10T12:00:00Z");
        assert!(!is_overdue(&t, now));
    }

    #[test]
    fn warnings_respect_horizon_and_owner() {
        let owner = UserId::generate();
        let other = UserId::generate();
        let now = at("2024-06-10T12:00:00Z");
        let horizon = TimeDelta::days(2);
        let tasks = vec![
            task(&owner, TaskStatus::InProgress, "2024-06-12T12:00:00Z"),
            task(&owner, TaskStatus::InProgress, "2024-06-12T12:00:01Z"),
            task(&other, TaskStatus::InProgress, "2024-06-11T00:00:00Z"),
            task(&owner, TaskStatus::Planned, "2024-06-11T00:00:00Z"),
            task(&owner, TaskStatus::InProgress, "2024-06-09T00:00:00Z"),
        ];
        let warned: Vec<_> = upcoming(&tasks, &owner, now, horizon)
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(warned, vec![tasks[0].id.clone(), tasks[4].id.clone()]);
    }
}
