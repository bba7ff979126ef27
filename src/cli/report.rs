use std::io::Write;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use crate::{
    storage::{entities::User, store::Store},
    tracking::{
        date::{resolve_user_date, ResolvedDay},
        day_report::{day_report, DayReport},
        graph::aggregate,
    },
    utils::{clock::Clock, time::parse_date},
};

use super::Args;

#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[command(flatten)]
    day: DaySelection,
}

#[derive(Debug, Parser)]
pub struct GraphCommand {
    #[command(flatten)]
    day: DaySelection,
}

#[derive(Debug, Clone, clap::Args)]
pub struct DaySelection {
    #[arg(long = "user", help = "Username whose time is shown")]
    username: String,
    #[arg(
        long,
        help = "Day to show as YYYY-MM-DD. Defaults to the current day in the user's timezone"
    )]
    date: Option<String>,
}

impl DaySelection {
    /// Unlike the web pages a malformed date is rejected instead of replaced with today.
    async fn resolve(&self, store: &dyn Store, clock: &dyn Clock) -> Result<(User, ResolvedDay)> {
        if let Some(date) = &self.date {
            if parse_date(date).is_none() {
                return Err(Args::command()
                    .error(
                        clap::error::ErrorKind::ValueValidation,
                        format!("Failed to validate date {date}, expected YYYY-MM-DD"),
                    )
                    .into());
            }
        }

        let user = store
            .user_by_username(&self.username)
            .await?
            .with_context(|| format!("User {} doesn't exist", self.username))?;
        let day = resolve_user_date(store, clock, &user, self.date.as_deref()).await?;
        Ok((user, day))
    }
}

/// Prints the report of a day: one summary line per project, a blank line, then every entry.
pub async fn process_report_command(
    ReportCommand { day }: ReportCommand,
    store: &dyn Store,
    clock: &dyn Clock,
    out: &mut impl Write,
) -> Result<()> {
    let (user, day) = day.resolve(store, clock).await?;
    let report = day_report(store, &user, day.date).await?;
    writeln!(out, "{} ({})", day.date, day.tz)?;
    write_report(&report, out)
}

fn write_report(report: &DayReport, out: &mut impl Write) -> Result<()> {
    for project in &report.summary {
        writeln!(
            out,
            "{}\t{}\t{}h",
            project.name, project.percent, project.hours
        )?;
    }
    writeln!(out)?;
    for detail in &report.detailed {
        for (hours, activity) in &detail.timeset {
            writeln!(out, "{}\t{hours}h\t{activity}", detail.project.name)?;
        }
    }
    writeln!(out, "Total\t{}h", report.total_hours)?;
    Ok(())
}

pub async fn process_graph_command(
    GraphCommand { day }: GraphCommand,
    store: &dyn Store,
    clock: &dyn Clock,
    out: &mut impl Write,
) -> Result<()> {
    let (user, day) = day.resolve(store, clock).await?;
    let graph = aggregate(store, &user, day.date).await?;
    serde_json::to_writer(&mut *out, &graph)?;
    writeln!(out)?;
    Ok(())
}
