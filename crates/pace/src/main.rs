mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use commands::comment::CommentCommand;
use commands::kpi::{KpiCommand, ReportCommand};
use commands::subtask::SubtaskCommand;
use commands::task::TaskCommand;
use commands::user::UserCommand;
use commands::{App, Context};
use error::CliError;
use output::Output;
use pace_core::config::{DEFAULT_CONFIG_PATH, load_config};
use pace_core::types::{CreateUserInput, Role};
use pace_core::{Pace, SystemClock};
use pace_db::DbStore;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pace", about = "Task tracking with deadline-aware KPI scoring")]
struct Cli {
    #[arg(long, env = "PACE_CONFIG", default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,
    /// Username to act as
    #[arg(long = "as", env = "PACE_USER", global = true)]
    acting: Option<String>,
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database and, optionally, the first admin
    Init {
        #[arg(long)]
        admin: Option<String>,
    },
    #[command(subcommand)]
    User(UserCommand),
    #[command(subcommand)]
    Task(TaskCommand),
    #[command(subcommand)]
    Subtask(SubtaskCommand),
    #[command(subcommand)]
    Comment(CommentCommand),
    /// Mark in-progress tasks past their deadline as overdue
    Reconcile,
    /// Your in-progress tasks due soon
    Warnings,
    #[command(subcommand)]
    Kpi(KpiCommand),
    /// Write an Excel report
    #[command(subcommand)]
    Report(ReportCommand),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli.config)?.with_env_overrides();
    let app = open_app(&config)?;
    let ctx = Context::new(&app, cli.acting.as_deref());

    let output = match cli.command {
        Command::Init { admin } => init(&app, admin, &config.db_path)?,
        Command::User(cmd) => commands::user::handle(&ctx, cmd)?,
        Command::Task(cmd) => commands::task::handle(&ctx, cmd)?,
        Command::Subtask(cmd) => commands::subtask::handle(&ctx, cmd)?,
        Command::Comment(cmd) => commands::comment::handle(&ctx, cmd)?,
        Command::Reconcile => Output::Reconciled(app.deadlines().reconcile(app.now())?),
        Command::Warnings => {
            let actor = ctx.actor()?;
            let deadlines = app.deadlines();
            let now = app.now();
            deadlines.reconcile(now)?;
            Output::Tasks(deadlines.warnings(&actor.user_id, now)?)
        }
        Command::Kpi(cmd) => commands::kpi::handle(&ctx, cmd)?,
        Command::Report(cmd) => commands::kpi::handle_report(&ctx, cmd)?,
    };
    output::render(&output, cli.json)
}

fn open_app(config: &pace_core::PaceConfig) -> Result<App, CliError> {
    if let Some(parent) = Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| CliError::Io {
                path: parent.display().to_string(),
                message: err.to_string(),
            })?;
        }
    }
    let conn = pace_db::schema::open_and_migrate(&config.db_path).map_err(|err| {
        CliError::Database {
            message: err.to_string(),
        }
    })?;
    Ok(Pace::new(DbStore::new(conn), SystemClock, config))
}

fn init(app: &App, admin: Option<String>, db_path: &str) -> Result<Output, CliError> {
    let Some(username) = admin else {
        return Ok(Output::message(format!("database ready at {db_path}")));
    };
    if !app.users().list()?.is_empty() {
        return Err(CliError::AlreadyInitialized);
    }
    let user = app.users().register(CreateUserInput {
        username,
        role: Role::Admin,
    })?;
    Ok(Output::User(user))
}
