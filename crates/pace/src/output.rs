use crate::error::CliError;
use owo_colors::{OwoColorize, Stream};
use pace_core::deadlines::ReconcileReport;
use pace_core::types::{
    Comment, ScoreBreakdown, Subtask, Task, TaskDetail, TaskStatus, User, UserScore,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    Task(Task),
    Tasks(Vec<Task>),
    Detail(TaskDetail),
    Subtask(Subtask),
    Subtasks(Vec<Subtask>),
    Comment(Comment),
    Comments(Vec<Comment>),
    User(User),
    Users(Vec<User>),
    Reconciled(ReconcileReport),
    Kpi {
        scope: String,
        #[serde(flatten)]
        breakdown: ScoreBreakdown,
    },
    Breakdown(Vec<UserScore>),
    Report {
        path: String,
        bytes: usize,
    },
    Message {
        message: String,
    },
}

impl Output {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

pub fn render(output: &Output, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
        return Ok(());
    }

    match output {
        Output::Task(task) => println!("{}", task_line(task)),
        Output::Tasks(tasks) => {
            if tasks.is_empty() {
                println!("no tasks");
            }
            for task in tasks {
                println!("{}", task_line(task));
            }
        }
        Output::Detail(detail) => print_detail(detail),
        Output::Subtask(subtask) => println!("{}", subtask_line(subtask)),
        Output::Subtasks(subtasks) => {
            for subtask in subtasks {
                println!("{}", subtask_line(subtask));
            }
        }
        Output::Comment(comment) => println!("{}", comment_line(comment)),
        Output::Comments(comments) => {
            for comment in comments {
                println!("{}", comment_line(comment));
            }
        }
        Output::User(user) => println!("{}", user_line(user)),
        Output::Users(users) => {
            for user in users {
                println!("{}", user_line(user));
            }
        }
        Output::Reconciled(report) => {
            println!("{} task(s) marked overdue", report.transitioned.len());
            for id in &report.transitioned {
                println!("  {id}");
            }
        }
        Output::Kpi { scope, breakdown } => {
            println!(
                "{scope}: {}",
                breakdown
                    .score
                    .if_supports_color(Stream::Stdout, |score| score.bold())
            );
            println!(
                "  on time {}, late {}, overdue {}, pending {} ({:.2} of {:.2} weighted)",
                breakdown.on_time,
                breakdown.late,
                breakdown.overdue,
                breakdown.pending,
                breakdown.numerator,
                breakdown.denominator,
            );
        }
        Output::Breakdown(rows) => {
            for row in rows {
                println!("{:<24} {:>6}", row.username, row.score);
            }
        }
        Output::Report { path, bytes } => println!("wrote {path} ({bytes} bytes)"),
        Output::Message { message } => println!("{message}"),
    }
    Ok(())
}

fn status_label(status: TaskStatus) -> String {
    let text = format!("{:<10}", status.as_str());
    match status {
        TaskStatus::Planned => text
            .if_supports_color(Stream::Stdout, |t| t.blue())
            .to_string(),
        TaskStatus::InProgress => text
            .if_supports_color(Stream::Stdout, |t| t.yellow())
            .to_string(),
        TaskStatus::Completed => text
            .if_supports_color(Stream::Stdout, |t| t.green())
            .to_string(),
        TaskStatus::Overdue => text
            .if_supports_color(Stream::Stdout, |t| t.red())
            .to_string(),
    }
}

fn task_line(task: &Task) -> String {
    format!(
        "{}  {}  {}  {}",
        task.id,
        status_label(task.status),
        task.due_at.format("%Y-%m-%d %H:%M"),
        task.title
    )
}

fn subtask_line(subtask: &Subtask) -> String {
    format!(
        "{}  {} .. {}  {}",
        subtask.id, subtask.start_date, subtask.end_date, subtask.title
    )
}

fn comment_line(comment: &Comment) -> String {
    format!(
        "{}  {}  {}: {}",
        comment.id,
        comment.created_at.format("%Y-%m-%d %H:%M"),
        comment.author_id,
        comment.body
    )
}

fn user_line(user: &User) -> String {
    format!("{}  {:<6}  {}", user.id, user.role.as_str(), user.username)
}

fn print_detail(detail: &TaskDetail) {
    let task = &detail.task;
    println!("{}", task_line(task));
    println!(
        "  priority {}, difficulty {}",
        task.priority, task.difficulty
    );
    println!("  creator {}", task.creator_id);
    if let Some(assignee) = &task.assignee_id {
        println!("  assignee {assignee}");
    }
    if let Some(parent) = &task.parent_id {
        println!("  depends on {parent}");
    }
    if let Some(done) = task.completed_at {
        println!("  completed {}", done.format("%Y-%m-%d %H:%M"));
    }
    if !task.description.is_empty() {
        println!();
        println!("{}", task.description);
    }
    if !detail.subtasks.is_empty() {
        println!();
        println!("subtasks:");
        for subtask in &detail.subtasks {
            println!("  {}", subtask_line(subtask));
        }
    }
    if !detail.comments.is_empty() {
        println!();
        println!("comments:");
        for comment in &detail.comments {
            println!("  {}", comment_line(comment));
        }
    }
    if !detail.dependents.is_empty() {
        println!();
        println!("dependents:");
        for dependent in &detail.dependents {
            println!("  {}", task_line(dependent));
        }
    }
}
