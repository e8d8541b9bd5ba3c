use crate::commands::{Context, RangeArgs, parse_due};
use crate::error::CliError;
use crate::output::Output;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use pace_core::types::{
    CreateTaskInput, Difficulty, Priority, TaskFilter, TaskId, TaskStatus, UpdateTaskInput,
};

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Create a task owned by the acting user
    Add(AddArgs),
    /// Show a task with its subtasks, comments and dependents
    Show { id: TaskId },
    List(ListArgs),
    Edit(EditArgs),
    Start { id: TaskId },
    Complete { id: TaskId },
    /// Move a completed or overdue task back to in progress
    Reopen { id: TaskId },
    #[command(alias = "delete")]
    Rm { id: TaskId },
    /// Tasks that depend on the given one
    Deps { id: TaskId },
}

#[derive(Args)]
pub struct AddArgs {
    pub title: String,
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,
    #[arg(long, value_parser = parse_due)]
    pub due: DateTime<Utc>,
    #[arg(long, default_value = "medium")]
    pub priority: Priority,
    #[arg(long, default_value = "medium")]
    pub difficulty: Difficulty,
    /// Planned or in-progress
    #[arg(long, default_value = "planned")]
    pub status: TaskStatus,
    /// Username to assign the task to
    #[arg(long)]
    pub assignee: Option<String>,
    /// Task this one depends on
    #[arg(long)]
    pub parent: Option<TaskId>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only tasks the acting user created or is assigned to
    #[arg(long, conflicts_with_all = ["creator", "assignee"])]
    pub mine: bool,
    #[arg(long)]
    pub creator: Option<String>,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long)]
    pub status: Option<TaskStatus>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub difficulty: Option<Difficulty>,
    /// Case-insensitive title substring
    #[arg(long)]
    pub title: Option<String>,
    #[command(flatten)]
    pub due: RangeArgs,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: TaskId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, short = 'd')]
    pub description: Option<String>,
    #[arg(long, value_parser = parse_due)]
    pub due: Option<DateTime<Utc>>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub difficulty: Option<Difficulty>,
    #[arg(long, conflicts_with = "unassign")]
    pub assignee: Option<String>,
    #[arg(long)]
    pub unassign: bool,
    #[arg(long, conflicts_with = "no_parent")]
    pub parent: Option<TaskId>,
    #[arg(long)]
    pub no_parent: bool,
}

pub fn handle(ctx: &Context<'_>, cmd: TaskCommand) -> Result<Output, CliError> {
    let tasks = ctx.app.tasks();
    match cmd {
        TaskCommand::Add(args) => {
            let actor = ctx.actor()?;
            let assignee_id = args
                .assignee
                .as_deref()
                .map(|name| ctx.user_id(name))
                .transpose()?;
            let input = CreateTaskInput {
                title: args.title,
                description: args.description,
                priority: args.priority,
                difficulty: args.difficulty,
                status: args.status,
                due_at: args.due,
                creator_id: actor.user_id.clone(),
                assignee_id,
                parent_id: args.parent,
            };
            Ok(Output::Task(tasks.create(&actor, input)?))
        }
        TaskCommand::Show { id } => Ok(Output::Detail(tasks.get(&id)?)),
        TaskCommand::List(args) => {
            let mut filter = TaskFilter {
                status: args.status,
                priority: args.priority,
                difficulty: args.difficulty,
                title_contains: args.title.filter(|needle| !needle.trim().is_empty()),
                due: args.due.range()?,
                ..TaskFilter::default()
            };
            if args.mine {
                filter.involving = Some(ctx.actor()?.user_id);
            }
            if let Some(name) = &args.creator {
                filter.creator_id = Some(ctx.user_id(name)?);
            }
            if let Some(name) = &args.assignee {
                filter.assignee_id = Some(ctx.user_id(name)?);
            }
            Ok(Output::Tasks(tasks.list(&filter)?))
        }
        TaskCommand::Edit(args) => {
            let actor = ctx.actor()?;
            let assignee_id = match (&args.assignee, args.unassign) {
                (Some(name), _) => Some(Some(ctx.user_id(name)?)),
                (None, true) => Some(None),
                (None, false) => None,
            };
            let parent_id = match (args.parent, args.no_parent) {
                (Some(parent), _) => Some(Some(parent)),
                (None, true) => Some(None),
                (None, false) => None,
            };
            let input = UpdateTaskInput {
                title: args.title,
                description: args.description,
                priority: args.priority,
                difficulty: args.difficulty,
                due_at: args.due,
                assignee_id,
                parent_id,
            };
            Ok(Output::Task(tasks.update(&actor, &args.id, input)?))
        }
        TaskCommand::Start { id } => Ok(Output::Task(tasks.start(&ctx.actor()?, &id)?)),
        TaskCommand::Complete { id } => Ok(Output::Task(tasks.complete(&ctx.actor()?, &id)?)),
        TaskCommand::Reopen { id } => Ok(Output::Task(tasks.reopen(&ctx.actor()?, &id)?)),
        TaskCommand::Rm { id } => {
            tasks.delete(&ctx.actor()?, &id)?;
            Ok(Output::message(format!("deleted {id}")))
        }
        TaskCommand::Deps { id } => Ok(Output::Tasks(tasks.dependents(&id)?)),
    }
}
