use crate::commands::Context;
use crate::error::CliError;
use crate::output::Output;
use clap::Subcommand;
use pace_core::types::{CommentId, TaskId};

#[derive(Subcommand)]
pub enum CommentCommand {
    Add { task: TaskId, body: String },
    /// Replace the text of one of your comments
    Edit { id: CommentId, body: String },
    #[command(alias = "delete")]
    Rm { id: CommentId },
    List { task: TaskId },
}

pub fn handle(ctx: &Context<'_>, cmd: CommentCommand) -> Result<Output, CliError> {
    let tasks = ctx.app.tasks();
    match cmd {
        CommentCommand::Add { task, body } => Ok(Output::Comment(tasks.add_comment(
            &ctx.actor()?,
            &task,
            &body,
        )?)),
        CommentCommand::Edit { id, body } => Ok(Output::Comment(tasks.edit_comment(
            &ctx.actor()?,
            &id,
            &body,
        )?)),
        CommentCommand::Rm { id } => {
            tasks.delete_comment(&ctx.actor()?, &id)?;
            Ok(Output::message(format!("deleted {id}")))
        }
        CommentCommand::List { task } => Ok(Output::Comments(tasks.comments(&task)?)),
    }
}
