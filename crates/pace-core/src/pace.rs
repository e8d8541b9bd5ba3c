use crate::aggregate::Aggregator;
use crate::clock::Clock;
use crate::comments::CommentRepository;
use crate::config::PaceConfig;
use crate::deadlines::{self, ReconcileReport};
use crate::error::{PaceError, TaskError, UserError};
use crate::scoring::ScoringEngine;
use crate::store::Store;
use crate::subtasks::SubtaskRepository;
use crate::tasks::TaskRepository;
use crate::types::{
    Actor, Comment, CommentId, CreateCommentInput, CreateSubtaskInput, CreateTaskInput,
    CreateUserInput, DateRange, ScopedKpi, ScoreBreakdown, Subtask, SubtaskId, Task,
    TaskDetail, TaskFilter, TaskId, TaskStatus, UpdateSubtaskInput, UpdateTaskInput, User,
    UserId, UserScore,
};
use crate::users::UserRepository;
use crate::validation::{
    validate_comment_body, validate_initial_status, validate_levels, validate_parent_cycle,
    validate_subtask_dates, validate_task_status_transition, validate_title, validate_username,
};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;

pub struct Pace<S: Store, C: Clock> {
    store: S,
    clock: C,
    engine: ScoringEngine,
    warning_horizon: TimeDelta,
}

impl<S: Store, C: Clock> Pace<S, C> {
    pub fn new(store: S, clock: C, config: &PaceConfig) -> Self {
        Self {
            store,
            clock,
            engine: ScoringEngine::new(config.scoring.clone()),
            warning_horizon: config.warning_horizon(),
        }
    }

    pub fn tasks(&self) -> TasksApi<'_, S, C> {
        TasksApi { core: self }
    }

    pub fn users(&self) -> UsersApi<'_, S, C> {
        UsersApi { core: self }
    }

    pub fn deadlines(&self) -> DeadlinesApi<'_, S, C> {
        DeadlinesApi { core: self }
    }

    pub fn kpi(&self) -> KpiApi<'_, S, C> {
        KpiApi { core: self }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Brings stored statuses up to date and returns the instant used, so
    /// the rest of the request sees the same `now`.
    fn reconciled(&self) -> Result<DateTime<Utc>, PaceError> {
        let now = self.clock.now();
        deadlines::reconcile(&self.store, now)?;
        Ok(now)
    }

    fn aggregator(&self) -> Aggregator<'_, S> {
        Aggregator::new(&self.store, &self.engine)
    }
}

fn deny(actor: &Actor, action: &str) -> PaceError {
    tracing::warn!(user = %actor.user_id, role = %actor.role, action, "request rejected");
    PaceError::unauthorized(format!("{action} is not permitted for this user"))
}

fn ensure_admin(actor: &Actor, action: &str) -> Result<(), PaceError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(deny(actor, action))
    }
}

fn ensure_can_edit(actor: &Actor, task: &Task, action: &str) -> Result<(), PaceError> {
    if actor.is_admin() || task.involves(&actor.user_id) {
        Ok(())
    } else {
        Err(deny(actor, action))
    }
}

fn ensure_user_exists<S: Store>(store: &S, user_id: &UserId) -> Result<(), PaceError> {
    match store.users().get(user_id)? {
        Some(_) => Ok(()),
        None => Err(UserError::NotFound.into()),
    }
}

fn load_task<S: Store>(store: &S, id: &TaskId) -> Result<Task, PaceError> {
    store
        .tasks()
        .get(id)?
        .ok_or_else(|| TaskError::NotFound.into())
}

fn parent_links<S: Store>(store: &S) -> Result<HashMap<TaskId, TaskId>, PaceError> {
    let tasks = store.tasks().list(&TaskFilter::default())?;
    Ok(tasks
        .into_iter()
        .filter_map(|task| task.parent_id.map(|parent| (task.id, parent)))
        .collect())
}

pub struct TasksApi<'a, S: Store, C: Clock> {
    core: &'a Pace<S, C>,
}

impl<'a, S: Store, C: Clock> TasksApi<'a, S, C> {
    pub fn create(&self, actor: &Actor, input: CreateTaskInput) -> Result<Task, PaceError> {
        if input.creator_id != actor.user_id && !actor.is_admin() {
            return Err(deny(actor, "creating a task for another user"));
        }
        validate_title(&input.title)?;
        validate_levels(Some(&input.priority), Some(&input.difficulty))?;
        validate_initial_status(input.status)?;

        let now = self.core.now();
        let task = self.core.store.with_tx(|store| {
            ensure_user_exists(store, &input.creator_id)?;
            if let Some(assignee) = &input.assignee_id {
                ensure_user_exists(store, assignee)?;
            }
            if let Some(parent) = &input.parent_id {
                load_task(store, parent)?;
            }
            Ok(store.tasks().create(input, now)?)
        })?;
        tracing::info!(task = %task.id, creator = %task.creator_id, "task created");
        Ok(task)
    }

    pub fn get(&self, id: &TaskId) -> Result<TaskDetail, PaceError> {
        self.core.reconciled()?;
        let store = &self.core.store;
        let task = load_task(store, id)?;
        Ok(TaskDetail {
            subtasks: store.subtasks().list(id)?,
            comments: store.comments().list(id)?,
            dependents: store.tasks().list(&TaskFilter {
                parent_id: Some(id.clone()),
                ..TaskFilter::default()
            })?,
            task,
        })
    }

    pub fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, PaceError> {
        self.core.reconciled()?;
        Ok(self.core.store.tasks().list(filter)?)
    }

    /// Tasks whose parent is `id`.
    pub fn dependents(&self, id: &TaskId) -> Result<Vec<Task>, PaceError> {
        self.core.reconciled()?;
        load_task(&self.core.store, id)?;
        let filter = TaskFilter {
            parent_id: Some(id.clone()),
            ..TaskFilter::default()
        };
        Ok(self.core.store.tasks().list(&filter)?)
    }

    pub fn update(
        &self,
        actor: &Actor,
        id: &TaskId,
        input: UpdateTaskInput,
    ) -> Result<Task, PaceError> {
        if let Some(title) = &input.title {
            validate_title(title)?;
        }
        validate_levels(input.priority.as_ref(), input.difficulty.as_ref())?;

        let now = self.core.now();
        let task = self.core.store.with_tx(|store| {
            let task = load_task(store, id)?;
            ensure_can_edit(actor, &task, "editing this task")?;
            if let Some(Some(assignee)) = &input.assignee_id {
                ensure_user_exists(store, assignee)?;
            }
            if let Some(Some(parent)) = &input.parent_id {
                load_task(store, parent)?;
                validate_parent_cycle(id, parent, &parent_links(store)?)?;
            }
            Ok(store.tasks().update(id, input, now)?)
        })?;
        tracing::info!(task = %task.id, "task updated");
        Ok(task)
    }

    pub fn start(&self, actor: &Actor, id: &TaskId) -> Result<Task, PaceError> {
        self.transition(actor, id, TaskStatus::InProgress, &[], "starting this task")
    }

    /// Stamps the completion time; finishing after the deadline scores as
    /// late.
    pub fn complete(&self, actor: &Actor, id: &TaskId) -> Result<Task, PaceError> {
        self.transition(actor, id, TaskStatus::Completed, &[], "completing this task")
    }

    /// Completed or Overdue back to InProgress. A reopened task that is still
    /// past due is flagged Overdue again by the next reconcile.
    pub fn reopen(&self, actor: &Actor, id: &TaskId) -> Result<Task, PaceError> {
        self.transition(
            actor,
            id,
            TaskStatus::InProgress,
            &[TaskStatus::Completed, TaskStatus::Overdue],
            "reopening this task",
        )
    }

    /// `only_from` narrows the allowed source states; empty means any the
    /// state machine permits.
    fn transition(
        &self,
        actor: &Actor,
        id: &TaskId,
        to: TaskStatus,
        only_from: &[TaskStatus],
        action: &str,
    ) -> Result<Task, PaceError> {
        let now = self.core.reconciled()?;
        let (task, from) = self.core.store.with_tx(|store| {
            let task = load_task(store, id)?;
            ensure_can_edit(actor, &task, action)?;
            if !only_from.is_empty() && !only_from.contains(&task.status) {
                return Err(TaskError::InvalidTransition {
                    from: task.status,
                    to,
                }
                .into());
            }
            validate_task_status_transition(task.status, to)?;
            let from = task.status;
            if from == to {
                return Ok((task, from));
            }
            let completed_at = (to == TaskStatus::Completed).then_some(now);
            let task = store.tasks().set_status(id, to, completed_at, now)?;
            Ok((task, from))
        })?;
        tracing::info!(task = %task.id, %from, %to, "task status changed");
        Ok(task)
    }

    pub fn delete(&self, actor: &Actor, id: &TaskId) -> Result<(), PaceError> {
        self.core.store.with_tx(|store| {
            let task = load_task(store, id)?;
            if task.creator_id != actor.user_id && !actor.is_admin() {
                return Err(deny(actor, "deleting this task"));
            }
            Ok(store.tasks().delete(id)?)
        })?;
        tracing::info!(task = %id, "task deleted");
        Ok(())
    }

    pub fn add_subtask(
        &self,
        actor: &Actor,
        input: CreateSubtaskInput,
    ) -> Result<Subtask, PaceError> {
        validate_title(&input.title)?;
        validate_subtask_dates(input.start_date, input.end_date)?;
        self.core.store.with_tx(|store| {
            let task = load_task(store, &input.task_id)?;
            ensure_can_edit(actor, &task, "adding a subtask")?;
            Ok(store.subtasks().create(input)?)
        })
    }

    pub fn update_subtask(
        &self,
        actor: &Actor,
        id: &SubtaskId,
        input: UpdateSubtaskInput,
    ) -> Result<Subtask, PaceError> {
        if let Some(title) = &input.title {
            validate_title(title)?;
        }
        self.core.store.with_tx(|store| {
            let current = store
                .subtasks()
                .get(id)?
                .ok_or(TaskError::SubtaskNotFound)?;
            let task = load_task(store, &current.task_id)?;
            ensure_can_edit(actor, &task, "editing a subtask")?;
            validate_subtask_dates(
                input.start_date.unwrap_or(current.start_date),
                input.end_date.unwrap_or(current.end_date),
            )?;
            Ok(store.subtasks().update(id, input)?)
        })
    }

    pub fn remove_subtask(&self, actor: &Actor, id: &SubtaskId) -> Result<(), PaceError> {
        self.core.store.with_tx(|store| {
            let current = store
                .subtasks()
                .get(id)?
                .ok_or(TaskError::SubtaskNotFound)?;
            let task = load_task(store, &current.task_id)?;
            ensure_can_edit(actor, &task, "removing a subtask")?;
            Ok(store.subtasks().delete(id)?)
        })
    }

    pub fn subtasks(&self, task_id: &TaskId) -> Result<Vec<Subtask>, PaceError> {
        load_task(&self.core.store, task_id)?;
        Ok(self.core.store.subtasks().list(task_id)?)
    }

    /// Any registered user may comment on any task.
    pub fn add_comment(
        &self,
        actor: &Actor,
        task_id: &TaskId,
        body: &str,
    ) -> Result<Comment, PaceError> {
        validate_comment_body(body)?;
        let now = self.core.now();
        self.core.store.with_tx(|store| {
            load_task(store, task_id)?;
            let input = CreateCommentInput {
                task_id: task_id.clone(),
                author_id: actor.user_id.clone(),
                body: body.trim().to_string(),
            };
            Ok(store.comments().add(input, now)?)
        })
    }

    /// Only the author may edit or delete a comment.
    pub fn edit_comment(
        &self,
        actor: &Actor,
        id: &CommentId,
        body: &str,
    ) -> Result<Comment, PaceError> {
        validate_comment_body(body)?;
        self.core.store.with_tx(|store| {
            let comment = store
                .comments()
                .get(id)?
                .ok_or(TaskError::CommentNotFound)?;
            if comment.author_id != actor.user_id {
                return Err(deny(actor, "editing another user's comment"));
            }
            Ok(store.comments().update(id, body.trim())?)
        })
    }

    pub fn delete_comment(&self, actor: &Actor, id: &CommentId) -> Result<(), PaceError> {
        self.core.store.with_tx(|store| {
            let comment = store
                .comments()
                .get(id)?
                .ok_or(TaskError::CommentNotFound)?;
            if comment.author_id != actor.user_id {
                return Err(deny(actor, "deleting another user's comment"));
            }
            Ok(store.comments().delete(id)?)
        })
    }

    pub fn comments(&self, task_id: &TaskId) -> Result<Vec<Comment>, PaceError> {
        load_task(&self.core.store, task_id)?;
        Ok(self.core.store.comments().list(task_id)?)
    }
}

pub struct UsersApi<'a, S: Store, C: Clock> {
    core: &'a Pace<S, C>,
}

impl<'a, S: Store, C: Clock> UsersApi<'a, S, C> {
    /// Adds a user on behalf of `actor`. Only admins may create admins.
    pub fn invite(&self, actor: &Actor, input: CreateUserInput) -> Result<User, PaceError> {
        if input.role.is_admin() {
            ensure_admin(actor, "creating an admin")?;
        }
        self.register(input)
    }

    /// Adds a user without a role check; used to bootstrap the directory.
    pub fn register(&self, input: CreateUserInput) -> Result<User, PaceError> {
        validate_username(&input.username)?;
        let now = self.core.now();
        let user = self.core.store.with_tx(|store| {
            if store.users().get_by_name(&input.username)?.is_some() {
                return Err(UserError::NameConflict {
                    username: input.username.clone(),
                }
                .into());
            }
            Ok(store.users().create(input, now)?)
        })?;
        tracing::info!(user = %user.id, username = %user.username, role = %user.role, "user registered");
        Ok(user)
    }

    pub fn get(&self, id: &UserId) -> Result<User, PaceError> {
        Ok(self.core.store.users().get(id)?.ok_or(UserError::NotFound)?)
    }

    pub fn by_name(&self, username: &str) -> Result<User, PaceError> {
        Ok(self
            .core
            .store
            .users()
            .get_by_name(username)?
            .ok_or(UserError::NotFound)?)
    }

    pub fn list(&self) -> Result<Vec<User>, PaceError> {
        Ok(self.core.store.users().list()?)
    }
}

pub struct DeadlinesApi<'a, S: Store, C: Clock> {
    core: &'a Pace<S, C>,
}

impl<'a, S: Store, C: Clock> DeadlinesApi<'a, S, C> {
    pub fn reconcile(&self, now: DateTime<Utc>) -> Result<ReconcileReport, PaceError> {
        deadlines::reconcile(&self.core.store, now)
    }

    /// In-progress tasks the user created whose deadline falls within the
    /// configured horizon. Reads the store as-is; call after reconciling to
    /// drop tasks that are already overdue.
    pub fn warnings(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<Vec<Task>, PaceError> {
        deadlines::upcoming_warnings(&self.core.store, user_id, now, self.core.warning_horizon)
    }
}

pub struct KpiApi<'a, S: Store, C: Clock> {
    core: &'a Pace<S, C>,
}

impl<'a, S: Store, C: Clock> KpiApi<'a, S, C> {
    /// Members may only score themselves.
    pub fn individual(
        &self,
        actor: &Actor,
        user_id: &UserId,
        range: Option<DateRange>,
    ) -> Result<ScoreBreakdown, PaceError> {
        if *user_id != actor.user_id {
            ensure_admin(actor, "scoring another user")?;
        }
        let now = self.core.reconciled()?;
        self.core.aggregator().individual_kpi(user_id, range, now)
    }

    pub fn organization(&self, range: Option<DateRange>) -> Result<ScoreBreakdown, PaceError> {
        let now = self.core.reconciled()?;
        self.core.aggregator().organization_kpi(range, now)
    }

    pub fn breakdown(&self, actor: &Actor, range: DateRange) -> Result<Vec<UserScore>, PaceError> {
        ensure_admin(actor, "viewing the per-user breakdown")?;
        let now = self.core.reconciled()?;
        self.core.aggregator().per_user_breakdown(range, now)
    }

    /// Tasks and score behind a single user's report.
    pub fn scoped(
        &self,
        actor: &Actor,
        user_id: &UserId,
        range: DateRange,
    ) -> Result<ScopedKpi, PaceError> {
        if *user_id != actor.user_id {
            ensure_admin(actor, "reporting on another user")?;
        }
        let now = self.core.reconciled()?;
        let aggregator = self.core.aggregator();
        let tasks = aggregator.individual_tasks(user_id, Some(range))?;
        let breakdown = self.core.engine.breakdown(&tasks, now);
        Ok(ScopedKpi {
            range,
            tasks,
            breakdown,
        })
    }
}
