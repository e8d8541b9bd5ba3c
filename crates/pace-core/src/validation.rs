use crate::error::{TaskError, UserError};
use crate::types::{Difficulty, Priority, TaskId, TaskStatus};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

pub const MAX_TITLE_LEN: usize = 150;
pub const MAX_USERNAME_LEN: usize = 64;

/// Letters, digits, `.`, `_` and `-`; no whitespace.
pub fn validate_username(username: &str) -> Result<(), UserError> {
    if username.is_empty() || username.len() > MAX_USERNAME_LEN {
        return Err(UserError::InvalidInput {
            message: format!("username must be 1 to {MAX_USERNAME_LEN} characters"),
        });
    }
    if let Some(c) = username
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, '.' | '_' | '-')))
    {
        return Err(UserError::InvalidInput {
            message: format!("username contains invalid character {c:?}"),
        });
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), TaskError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskError::InvalidInput {
            message: "title must not be empty".to_string(),
        });
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(TaskError::InvalidInput {
            message: format!("title must be at most {MAX_TITLE_LEN} characters"),
        });
    }
    Ok(())
}

/// New input must use a known value; only stored rows may be unrecognized.
pub fn validate_levels(
    priority: Option<&Priority>,
    difficulty: Option<&Difficulty>,
) -> Result<(), TaskError> {
    if let Some(priority) = priority {
        if !priority.is_known() {
            return Err(TaskError::InvalidInput {
                message: format!("unknown priority '{priority}'"),
            });
        }
    }
    if let Some(difficulty) = difficulty {
        if !difficulty.is_known() {
            return Err(TaskError::InvalidInput {
                message: format!("unknown difficulty '{difficulty}'"),
            });
        }
    }
    Ok(())
}

pub fn validate_initial_status(status: TaskStatus) -> Result<(), TaskError> {
    match status {
        TaskStatus::Planned | TaskStatus::InProgress => Ok(()),
        other => Err(TaskError::InvalidInput {
            message: format!("a new task cannot start as {other}"),
        }),
    }
}

/// Manual transitions. `InProgress -> Overdue` belongs to the deadline
/// monitor and is rejected here. Finishing an overdue task is allowed and
/// scores as a late completion.
pub fn validate_task_status_transition(from: TaskStatus, to: TaskStatus) -> Result<(), TaskError> {
    use TaskStatus::{Completed, InProgress, Overdue, Planned};

    if from == to {
        return Ok(());
    }

    let valid = matches!(
        (from, to),
        (Planned, InProgress)
            | (InProgress, Completed)
            | (Overdue, Completed)
            | (Completed, InProgress)
            | (Overdue, InProgress)
    );

    if valid {
        Ok(())
    } else {
        Err(TaskError::InvalidTransition { from, to })
    }
}

pub fn validate_subtask_dates(start: NaiveDate, end: NaiveDate) -> Result<(), TaskError> {
    if start > end {
        return Err(TaskError::InvalidInput {
            message: format!("subtask starts ({start}) after it ends ({end})"),
        });
    }
    Ok(())
}

pub fn validate_comment_body(body: &str) -> Result<(), TaskError> {
    if body.trim().is_empty() {
        return Err(TaskError::InvalidInput {
            message: "comment must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Rejects linking `task_id` under `parent_id` when that would close a loop
/// in the dependency chain. `parents` maps each task to its current parent.
pub fn validate_parent_cycle(
    task_id: &TaskId,
    parent_id: &TaskId,
    parents: &HashMap<TaskId, TaskId>,
) -> Result<(), TaskError> {
    if task_id == parent_id {
        return Err(TaskError::CycleDetected);
    }

    let mut visited: HashSet<&TaskId> = HashSet::new();
    let mut current = Some(parent_id);
    while let Some(id) = current {
        if id == task_id {
            return Err(TaskError::CycleDetected);
        }
        if !visited.insert(id) {
            break;
        }
        current = parents.get(id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_transitions() {
        use TaskStatus::{Completed, InProgress, Overdue, Planned};

        assert!(validate_task_status_transition(Planned, InProgress).is_ok());
        assert!(validate_task_status_transition(InProgress, Completed).is_ok());
        assert!(validate_task_status_transition(Completed, InProgress).is_ok());
        assert!(validate_task_status_transition(Overdue, InProgress).is_ok());
        assert!(validate_task_status_transition(Overdue, Completed).is_ok());
        assert!(validate_task_status_transition(Completed, Completed).is_ok());

        assert!(validate_task_status_transition(Planned, Completed).is_err());
        assert!(validate_task_status_transition(InProgress, Overdue).is_err());
        assert!(validate_task_status_transition(Completed, Overdue).is_err());
        assert!(validate_task_status_transition(InProgress, Planned).is_err());
    }

    #[test]
    fn usernames_are_plain_tokens() {
        assert!(validate_username("m.ivanova").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("two words").is_err());
    }

    #[test]
    fn blank_title_is_rejected() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title("Quarterly audit").is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn new_tasks_cannot_start_finished() {
        assert!(validate_initial_status(TaskStatus::Planned).is_ok());
        assert!(validate_initial_status(TaskStatus::InProgress).is_ok());
        assert!(validate_initial_status(TaskStatus::Completed).is_err());
        assert!(validate_initial_status(TaskStatus::Overdue).is_err());
    }

    #[test]
    fn unrecognized_levels_are_rejected_on_input() {
        let odd = Priority::Unrecognized("Urgent".to_string());
        assert!(validate_levels(Some(&odd), None).is_err());
        assert!(validate_levels(Some(&Priority::Low), Some(&Difficulty::Hard)).is_ok());
    }

    #[test]
    fn subtask_must_not_end_before_it_starts() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        assert!(validate_subtask_dates(day(1), day(1)).is_ok());
        assert!(validate_subtask_dates(day(3), day(2)).is_err());
    }

    #[test]
    fn parent_cycles_are_detected() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        let c = TaskId::generate();
        // c -> b -> a
        let parents = HashMap::from([(c.clone(), b.clone()), (b.clone(), a.clone())]);

        assert!(matches!(
            validate_parent_cycle(&a, &c, &parents),
            Err(TaskError::CycleDetected)
        ));
        assert!(matches!(
            validate_parent_cycle(&a, &a, &parents),
            Err(TaskError::CycleDetected)
        ));
        assert!(validate_parent_cycle(&c, &a, &parents).is_ok());
    }
}
