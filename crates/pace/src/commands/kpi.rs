use crate::commands::{Context, PeriodArgs, RangeArgs};
use crate::error::CliError;
use crate::output::Output;
use clap::{Args, Subcommand};
use pace_report::{Report, build_organization_report, build_scoped_report};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum KpiCommand {
    /// Score of the acting user
    Me(RangeArgs),
    /// Score of another user (admins only)
    User {
        username: String,
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Score over every task
    Org(RangeArgs),
    /// One score per user (admins only)
    Breakdown(PeriodArgs),
}

#[derive(Subcommand)]
pub enum ReportCommand {
    /// Task sheet with the period score for one user (yourself by default)
    User(UserReportArgs),
    /// Per-user scores with a chart (admins only)
    Org(OrgReportArgs),
}

#[derive(Args)]
pub struct UserReportArgs {
    pub username: Option<String>,
    #[command(flatten)]
    pub period: PeriodArgs,
    /// Directory to write the workbook into
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Args)]
pub struct OrgReportArgs {
    #[command(flatten)]
    pub period: PeriodArgs,
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

pub fn handle(ctx: &Context<'_>, cmd: KpiCommand) -> Result<Output, CliError> {
    let kpi = ctx.app.kpi();
    match cmd {
        KpiCommand::Me(range) => {
            let actor = ctx.actor()?;
            let breakdown = kpi.individual(&actor, &actor.user_id, range.range()?)?;
            Ok(Output::Kpi {
                scope: "your KPI".to_string(),
                breakdown,
            })
        }
        KpiCommand::User { username, range } => {
            let actor = ctx.actor()?;
            let user_id = ctx.scoped_user(&actor, &username)?;
            let breakdown = kpi.individual(&actor, &user_id, range.range()?)?;
            Ok(Output::Kpi {
                scope: format!("KPI of {username}"),
                breakdown,
            })
        }
        KpiCommand::Org(range) => Ok(Output::Kpi {
            scope: "organization KPI".to_string(),
            breakdown: kpi.organization(range.range()?)?,
        }),
        KpiCommand::Breakdown(period) => {
            let actor = ctx.actor()?;
            Ok(Output::Breakdown(kpi.breakdown(&actor, period.range()?)?))
        }
    }
}

pub fn handle_report(ctx: &Context<'_>, cmd: ReportCommand) -> Result<Output, CliError> {
    let actor = ctx.actor()?;
    let kpi = ctx.app.kpi();
    let (report, out) = match cmd {
        ReportCommand::User(args) => {
            let user_id = match &args.username {
                Some(name) => ctx.scoped_user(&actor, name)?,
                None => actor.user_id.clone(),
            };
            let scoped = kpi.scoped(&actor, &user_id, args.period.range()?)?;
            let report =
                build_scoped_report(&scoped.tasks, scoped.breakdown.score, &scoped.range)?;
            (report, args.out)
        }
        ReportCommand::Org(args) => {
            let range = args.period.range()?;
            let breakdown = kpi.breakdown(&actor, range)?;
            (build_organization_report(&breakdown, &range)?, args.out)
        }
    };
    write_report(&report, &out)
}

fn write_report(report: &Report, dir: &std::path::Path) -> Result<Output, CliError> {
    let path = dir.join(&report.filename);
    std::fs::write(&path, &report.bytes).map_err(|err| CliError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    tracing::info!(path = %path.display(), "report written");
    Ok(Output::Report {
        path: path.display().to_string(),
        bytes: report.bytes.len(),
    })
}
