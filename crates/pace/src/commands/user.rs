use crate::commands::Context;
use crate::error::CliError;
use crate::output::Output;
use clap::Subcommand;
use pace_core::types::{CreateUserInput, Role};

#[derive(Subcommand)]
pub enum UserCommand {
    /// Register a user; only admins may add admins
    Add {
        username: String,
        #[arg(long, default_value = "member")]
        role: Role,
    },
    List,
}

pub fn handle(ctx: &Context<'_>, cmd: UserCommand) -> Result<Output, CliError> {
    match cmd {
        UserCommand::Add { username, role } => {
            let actor = ctx.actor()?;
            let user = ctx
                .app
                .users()
                .invite(&actor, CreateUserInput { username, role })?;
            Ok(Output::User(user))
        }
        UserCommand::List => Ok(Output::Users(ctx.app.users().list()?)),
    }
}
