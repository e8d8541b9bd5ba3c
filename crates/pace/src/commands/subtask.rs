use crate::commands::{Context, parse_day};
use crate::error::CliError;
use crate::output::Output;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use pace_core::types::{CreateSubtaskInput, SubtaskId, TaskId, UpdateSubtaskInput};

#[derive(Subcommand)]
pub enum SubtaskCommand {
    Add(AddArgs),
    Edit(EditArgs),
    #[command(alias = "delete")]
    Rm { id: SubtaskId },
    List { task: TaskId },
}

#[derive(Args)]
pub struct AddArgs {
    pub task: TaskId,
    pub title: String,
    #[arg(long, value_parser = parse_day)]
    pub start: NaiveDate,
    #[arg(long, value_parser = parse_day)]
    pub end: NaiveDate,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: SubtaskId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, value_parser = parse_day)]
    pub start: Option<NaiveDate>,
    #[arg(long, value_parser = parse_day)]
    pub end: Option<NaiveDate>,
}

pub fn handle(ctx: &Context<'_>, cmd: SubtaskCommand) -> Result<Output, CliError> {
    let tasks = ctx.app.tasks();
    match cmd {
        SubtaskCommand::Add(args) => {
            let input = CreateSubtaskInput {
                task_id: args.task,
                title: args.title,
                start_date: args.start,
                end_date: args.end,
            };
            Ok(Output::Subtask(tasks.add_subtask(&ctx.actor()?, input)?))
        }
        SubtaskCommand::Edit(args) => {
            let input = UpdateSubtaskInput {
                title: args.title,
                start_date: args.start,
                end_date: args.end,
            };
            Ok(Output::Subtask(
                tasks.update_subtask(&ctx.actor()?, &args.id, input)?,
            ))
        }
        SubtaskCommand::Rm { id } => {
            tasks.remove_subtask(&ctx.actor()?, &id)?;
            Ok(Output::message(format!("deleted {id}")))
        }
        SubtaskCommand::List { task } => Ok(Output::Subtasks(tasks.subtasks(&task)?)),
    }
}
