#![allow(dead_code)]

use chrono::{DateTime, TimeDelta, Utc};
use pace_core::types::{
    Actor, CreateTaskInput, CreateUserInput, Difficulty, Priority, Role, TaskStatus,
};
use pace_core::{Clock, Pace, PaceConfig};
use pace_db::{DbStore, schema};
use std::cell::Cell;

pub fn at(value: &str) -> DateTime<Utc> {
    value.parse().unwrap()
}

/// A clock tests can move forward.
pub struct TestClock(Cell<DateTime<Utc>>);

impl TestClock {
    pub fn at(value: &str) -> Self {
        Self(Cell::new(at(value)))
    }

    pub fn advance(&self, by: TimeDelta) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}

pub fn test_store() -> DbStore {
    DbStore::new(schema::with_test_db().unwrap())
}

pub fn pace<C: Clock>(clock: C) -> Pace<DbStore, C> {
    Pace::new(test_store(), clock, &PaceConfig::default())
}

pub fn register<C: Clock>(pace: &Pace<DbStore, C>, username: &str, role: Role) -> Actor {
    let user = pace
        .users()
        .register(CreateUserInput {
            username: username.to_string(),
            role,
        })
        .unwrap();
    Actor::from(&user)
}

pub fn new_task(creator: &Actor, title: &str, due_at: DateTime<Utc>) -> CreateTaskInput {
    CreateTaskInput {
        title: title.to_string(),
        description: String::new(),
        priority: Priority::Medium,
        difficulty: Difficulty::Medium,
        status: TaskStatus::InProgress,
        due_at,
        creator_id: creator.user_id.clone(),
        assignee_id: None,
        parent_id: None,
    }
}
