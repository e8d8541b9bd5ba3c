//! KPI scoring engine.
//!
//! Each task carries a weight of `difficulty × priority`. Completed tasks
//! earn their full weight when finished on time and `late_penalty` of it
//! otherwise; overdue tasks earn `overdue_penalty` of it; everything else
//! earns nothing. The score is the earned share of the total weight, as a
//! percentage rounded to two decimals.

use crate::config::ScoringConfig;
use crate::types::{Score, ScoreBreakdown, Task, TaskStatus};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    OnTime,
    Late,
    Overdue,
    Pending,
}

/// A completed task is late when it was finished after its deadline. Rows
/// without a completion time fall back to comparing the deadline with `now`.
pub fn classify(task: &Task, now: DateTime<Utc>) -> Outcome {
    match task.status {
        TaskStatus::Completed => match task.completed_at {
            Some(done) if done <= task.due_at => Outcome::OnTime,
            Some(_) => Outcome::Late,
            None if task.due_at >= now => Outcome::OnTime,
            None => Outcome::Late,
        },
        TaskStatus::Overdue => Outcome::Overdue,
        TaskStatus::Planned | TaskStatus::InProgress => Outcome::Pending,
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn weight(&self, task: &Task) -> f64 {
        self.config.task_weight(task)
    }

    fn multiplier(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::OnTime => 1.0,
            Outcome::Late => self.config.late_penalty,
            Outcome::Overdue => self.config.overdue_penalty,
            Outcome::Pending => 0.0,
        }
    }

    pub fn score(&self, tasks: &[Task], now: DateTime<Utc>) -> Score {
        self.breakdown(tasks, now).score
    }

    pub fn breakdown(&self, tasks: &[Task], now: DateTime<Utc>) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown::default();
        for task in tasks {
            let weight = self.weight(task);
            let outcome = classify(task, now);
            match outcome {
                Outcome::OnTime => breakdown.on_time += 1,
                Outcome::Late => breakdown.late += 1,
                Outcome::Overdue => breakdown.overdue += 1,
                Outcome::Pending => breakdown.pending += 1,
            }
            breakdown.numerator += weight * self.multiplier(outcome);
            breakdown.denominator += weight;
        }
        breakdown.score = Score::from_ratio(breakdown.numerator, breakdown.denominator);
        tracing::debug!(
            tasks = tasks.len(),
            numerator = breakdown.numerator,
            denominator = breakdown.denominator,
            score = %breakdown.score,
            "scored task set"
        );
        breakdown
    }
}
