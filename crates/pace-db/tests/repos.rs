mod common;

use chrono::NaiveDate;
use common::{at, test_store};
use pace_core::comments::CommentRepository;
use pace_core::error::{PaceError, TaskError, UserError};
use pace_core::store::Store;
use pace_core::subtasks::SubtaskRepository;
use pace_core::tasks::TaskRepository;
use pace_core::types::{
    CreateCommentInput, CreateSubtaskInput, CreateTaskInput, CreateUserInput, DateRange,
    Difficulty, Priority, Role, TaskFilter, TaskStatus, UpdateTaskInput, User,
};
use pace_core::users::UserRepository;
use pace_db::DbStore;

fn user(store: &DbStore, username: &str) -> User {
    store
        .users()
        .create(
            CreateUserInput {
                username: username.to_string(),
                role: Role::Member,
            },
            at("2024-01-01T00:00:00Z"),
        )
        .unwrap()
}

fn input(creator: &User, title: &str, due: &str) -> CreateTaskInput {
    CreateTaskInput {
        title: title.to_string(),
        description: "details".to_string(),
        priority: Priority::High,
        difficulty: Difficulty::Easy,
        status: TaskStatus::Planned,
        due_at: at(due),
        creator_id: creator.id.clone(),
        assignee_id: None,
        parent_id: None,
    }
}

#[test]
fn task_round_trips_through_store() {
    let store = test_store();
    let alice = user(&store, "alice");
    let now = at("2024-03-01T09:00:00Z");

    let created = store
        .tasks()
        .create(input(&alice, "  Draft budget ", "2024-03-10T17:00:00Z"), now)
        .unwrap();
    assert_eq!(created.title, "Draft budget");

    let fetched = store.tasks().get(&created.id).unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.completed_at, None);
}

#[test]
fn list_matches_creator_or_assignee_in_due_order() {
    let store = test_store();
    let alice = user(&store, "alice");
    let bob = user(&store, "bob");
    let now = at("2024-03-01T09:00:00Z");

    let later = store
        .tasks()
        .create(input(&alice, "Later", "2024-03-20T00:00:00Z"), now)
        .unwrap();
    let mut assigned = input(&bob, "Assigned", "2024-03-05T00:00:00Z");
    assigned.assignee_id = Some(alice.id.clone());
    let assigned = store.tasks().create(assigned, now).unwrap();
    store
        .tasks()
        .create(input(&bob, "Not hers", "2024-03-02T00:00:00Z"), now)
        .unwrap();

    let ids: Vec<_> = store
        .tasks()
        .list(&TaskFilter::involving(&alice.id))
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, vec![assigned.id, later.id]);
}

#[test]
fn due_range_includes_whole_end_day() {
    let store = test_store();
    let alice = user(&store, "alice");
    let now = at("2024-03-01T09:00:00Z");
    for due in [
        "2024-02-29T23:59:59Z",
        "2024-03-01T00:00:00Z",
        "2024-03-31T23:59:00Z",
        "2024-04-01T00:00:00Z",
    ] {
        store.tasks().create(input(&alice, due, due), now).unwrap();
    }

    let march = DateRange::parse("2024-03-01", "2024-03-31").unwrap();
    let titles: Vec<_> = store
        .tasks()
        .list(&TaskFilter::default().within(Some(march)))
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["2024-03-01T00:00:00Z", "2024-03-31T23:59:00Z"]);
}

fn titles(store: &DbStore, filter: &TaskFilter) -> Vec<String> {
    store
        .tasks()
        .list(filter)
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect()
}

#[test]
fn title_search_is_case_insensitive_substring() {
    let store = test_store();
    let alice = user(&store, "alice");
    let now = at("2024-03-01T09:00:00Z");
    for (title, due) in [
        ("Quarterly Budget", "2024-03-10T00:00:00Z"),
        ("budget review", "2024-03-11T00:00:00Z"),
        ("Payroll", "2024-03-12T00:00:00Z"),
        ("100% done_ish", "2024-03-13T00:00:00Z"),
    ] {
        store.tasks().create(input(&alice, title, due), now).unwrap();
    }

    let filter = TaskFilter {
        title_contains: Some("BUDGET".to_string()),
        ..TaskFilter::default()
    };
    assert_eq!(titles(&store, &filter), vec!["Quarterly Budget", "budget review"]);

    // Wildcards in the needle match literally.
    let filter = TaskFilter {
        title_contains: Some("0% done_".to_string()),
        ..TaskFilter::default()
    };
    assert_eq!(titles(&store, &filter), vec!["100% done_ish"]);
    let filter = TaskFilter {
        title_contains: Some("%".to_string()),
        ..TaskFilter::default()
    };
    assert_eq!(titles(&store, &filter), vec!["100% done_ish"]);
}

#[test]
fn priority_filter_keeps_matching_tasks() {
    let store = test_store();
    let alice = user(&store, "alice");
    let now = at("2024-03-01T09:00:00Z");
    store
        .tasks()
        .create(input(&alice, "Urgent", "2024-03-10T00:00:00Z"), now)
        .unwrap();
    let mut relaxed = input(&alice, "Someday", "2024-03-11T00:00:00Z");
    relaxed.priority = Priority::Low;
    store.tasks().create(relaxed, now).unwrap();

    let filter = TaskFilter {
        priority: Some(Priority::Low),
        ..TaskFilter::default()
    };
    assert_eq!(titles(&store, &filter), vec!["Someday"]);
    let filter = TaskFilter {
        priority: Some(Priority::Medium),
        ..TaskFilter::default()
    };
    assert!(titles(&store, &filter).is_empty());
}

#[test]
fn difficulty_filter_combines_with_other_criteria() {
    let store = test_store();
    let alice = user(&store, "alice");
    let now = at("2024-03-01T09:00:00Z");
    let mut hard = input(&alice, "Migrate ledger", "2024-03-10T00:00:00Z");
    hard.difficulty = Difficulty::Hard;
    store.tasks().create(hard, now).unwrap();
    let mut hard_low = input(&alice, "Migrate archive", "2024-03-11T00:00:00Z");
    hard_low.difficulty = Difficulty::Hard;
    hard_low.priority = Priority::Low;
    store.tasks().create(hard_low, now).unwrap();
    store
        .tasks()
        .create(input(&alice, "Migrate notes", "2024-03-12T00:00:00Z"), now)
        .unwrap();

    let filter = TaskFilter {
        difficulty: Some(Difficulty::Hard),
        ..TaskFilter::default()
    };
    assert_eq!(titles(&store, &filter), vec!["Migrate ledger", "Migrate archive"]);

    let filter = TaskFilter {
        difficulty: Some(Difficulty::Hard),
        priority: Some(Priority::High),
        title_contains: Some("migrate".to_string()),
        ..TaskFilter::default()
    };
    assert_eq!(titles(&store, &filter), vec!["Migrate ledger"]);
}

#[test]
fn update_can_clear_assignee() {
    let store = test_store();
    let alice = user(&store, "alice");
    let bob = user(&store, "bob");
    let now = at("2024-03-01T09:00:00Z");
    let mut create = input(&alice, "Review", "2024-03-10T00:00:00Z");
    create.assignee_id = Some(bob.id.clone());
    let task = store.tasks().create(create, now).unwrap();

    let later = at("2024-03-02T09:00:00Z");
    let updated = store
        .tasks()
        .update(
            &task.id,
            UpdateTaskInput {
                assignee_id: Some(None),
                priority: Some(Priority::Low),
                ..UpdateTaskInput::default()
            },
            later,
        )
        .unwrap();
    assert_eq!(updated.assignee_id, None);
    assert_eq!(updated.priority, Priority::Low);
    assert_eq!(updated.updated_at, later);
    assert_eq!(store.tasks().get(&task.id).unwrap().unwrap(), updated);
}

#[test]
fn mark_overdue_only_moves_in_progress_rows() {
    let store = test_store();
    let alice = user(&store, "alice");
    let now = at("2024-03-01T09:00:00Z");
    let planned = store
        .tasks()
        .create(input(&alice, "Planned", "2024-02-01T00:00:00Z"), now)
        .unwrap();
    let mut running = input(&alice, "Running", "2024-02-01T00:00:00Z");
    running.status = TaskStatus::InProgress;
    let running = store.tasks().create(running, now).unwrap();

    assert!(!store.tasks().mark_overdue(&planned.id, now).unwrap());
    assert!(store.tasks().mark_overdue(&running.id, now).unwrap());
    assert!(!store.tasks().mark_overdue(&running.id, now).unwrap());
    assert_eq!(
        store.tasks().get(&running.id).unwrap().unwrap().status,
        TaskStatus::Overdue
    );
}

#[test]
fn deleting_a_task_cascades_and_unlinks_dependents() {
    let store = test_store();
    let alice = user(&store, "alice");
    let now = at("2024-03-01T09:00:00Z");
    let parent = store
        .tasks()
        .create(input(&alice, "Parent", "2024-03-10T00:00:00Z"), now)
        .unwrap();
    let mut child = input(&alice, "Child", "2024-03-09T00:00:00Z");
    child.parent_id = Some(parent.id.clone());
    let child = store.tasks().create(child, now).unwrap();

    let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
    let subtask = store
        .subtasks()
        .create(CreateSubtaskInput {
            task_id: parent.id.clone(),
            title: "Collect receipts".to_string(),
            start_date: day(2),
            end_date: day(4),
        })
        .unwrap();
    let comment = store
        .comments()
        .add(
            CreateCommentInput {
                task_id: parent.id.clone(),
                author_id: alice.id.clone(),
                body: "Started".to_string(),
            },
            now,
        )
        .unwrap();

    store.tasks().delete(&parent.id).unwrap();

    assert!(store.tasks().get(&parent.id).unwrap().is_none());
    assert!(store.subtasks().get(&subtask.id).unwrap().is_none());
    assert!(store.comments().get(&comment.id).unwrap().is_none());
    assert_eq!(store.tasks().get(&child.id).unwrap().unwrap().parent_id, None);
    assert!(matches!(
        store.tasks().delete(&parent.id),
        Err(TaskError::NotFound)
    ));
}

#[test]
fn unrecognized_stored_levels_decode_without_error() {
    let store = test_store();
    let alice = user(&store, "alice");
    store
        .connection()
        .execute(
            "INSERT INTO tasks (id, title, description, priority, difficulty, status, due_at, creator_id, created_at, updated_at)
             VALUES ('task_01HZY3V6QK8J9M2N4P5R6S7T8V', 'Imported', '', 'Urgent', 'Epic', 'Completed', '2024-01-10T00:00:00.000Z', ?1, '2024-01-01T00:00:00.000Z', '2024-01-01T00:00:00.000Z')",
            [alice.id.as_str()],
        )
        .unwrap();

    let tasks = store.tasks().list(&TaskFilter::involving(&alice.id)).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].priority, Priority::Unrecognized("Urgent".to_string()));
    assert_eq!(tasks[0].difficulty, Difficulty::Unrecognized("Epic".to_string()));
    assert_eq!(tasks[0].completed_at, None);
}

#[test]
fn duplicate_username_is_a_conflict() {
    let store = test_store();
    user(&store, "alice");
    let err = store
        .users()
        .create(
            CreateUserInput {
                username: "alice".to_string(),
                role: Role::Admin,
            },
            at("2024-01-02T00:00:00Z"),
        )
        .unwrap_err();
    assert!(matches!(err, UserError::NameConflict { .. }));
}

#[test]
fn failed_transaction_rolls_back_every_write() {
    let store = test_store();
    let alice = user(&store, "alice");
    let now = at("2024-03-01T09:00:00Z");

    let result: Result<(), PaceError> = store.with_tx(|store| {
        store
            .tasks()
            .create(input(&alice, "Doomed", "2024-03-10T00:00:00Z"), now)?;
        Err(PaceError::Storage {
            message: "simulated failure".to_string(),
        })
    });

    assert!(result.is_err());
    assert!(store.tasks().list(&TaskFilter::default()).unwrap().is_empty());
}
