use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::{
    storage::{
        entities::{Project, ProjectId, TrackedTimeWithProject, User},
        store::Store,
    },
    utils::percentage::{hours_percentage, Percentage},
};

use super::palette::{self, ColorClass, PALETTE};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReportError {
    #[error(
        "Too many projects to build progress bar: {projects} tracked, palette has {slots} colors",
        slots = PALETTE.len()
    )]
    PaletteExhausted { projects: usize },
}

/// One line of the day summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub id: ProjectId,
    #[serde(flatten)]
    pub colors: ColorClass,
    pub name: String,
    pub hours: f64,
    pub percent: Percentage,
}

/// Every entry logged against a project during the day, in logging order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectDetail {
    pub project: Project,
    pub timeset: Vec<(f64, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayReport {
    /// Sorted by project name.
    pub summary: Vec<ProjectSummary>,
    /// Ordered by the first entry of each project.
    pub detailed: Vec<ProjectDetail>,
    pub total_hours: f64,
}

#[derive(Debug)]
struct ProjectGroup {
    project: Project,
    colors: ColorClass,
    hours: f64,
    timeset: Vec<(f64, String)>,
}

/// Builds the report of a day from its entries, which are expected in logging order.
///
/// Projects take palette slots in the order they first appear. A day with more distinct projects
/// than the palette has slots is rejected rather than truncated.
pub fn build_report(entries: &[TrackedTimeWithProject]) -> Result<DayReport, ReportError> {
    let (groups, total_hours) = group_by_project(entries)?;
    let summary = summarize(&groups, total_hours);
    let detailed = groups
        .into_iter()
        .map(|group| ProjectDetail {
            project: group.project,
            timeset: group.timeset,
        })
        .collect();

    Ok(DayReport {
        summary,
        detailed,
        total_hours,
    })
}

/// First pass: sums hours per project and for the whole day, preserving first-seen order.
fn group_by_project(
    entries: &[TrackedTimeWithProject],
) -> Result<(Vec<ProjectGroup>, f64), ReportError> {
    let mut positions = HashMap::<ProjectId, usize>::new();
    let mut groups = Vec::<ProjectGroup>::new();
    let mut total_hours = 0.;

    for TrackedTimeWithProject { entry, project } in entries {
        let position = match positions.get(&project.id) {
            Some(&position) => position,
            None => {
                let colors = palette::slot(groups.len()).ok_or_else(|| {
                    ReportError::PaletteExhausted {
                        projects: count_projects(entries),
                    }
                })?;
                groups.push(ProjectGroup {
                    project: project.clone(),
                    colors,
                    hours: 0.,
                    timeset: vec![],
                });
                positions.insert(project.id, groups.len() - 1);
                groups.len() - 1
            }
        };

        let group = &mut groups[position];
        group.hours += entry.hours;
        group.timeset.push((entry.hours, entry.activity.clone()));
        total_hours += entry.hours;
    }

    Ok((groups, total_hours))
}

fn count_projects(entries: &[TrackedTimeWithProject]) -> usize {
    entries
        .iter()
        .map(|v| v.project.id)
        .collect::<HashSet<_>>()
        .len()
}

/// Second pass: percentages of the day, sorted by project name.
fn summarize(groups: &[ProjectGroup], total_hours: f64) -> Vec<ProjectSummary> {
    let mut summary = groups
        .iter()
        .map(|group| ProjectSummary {
            id: group.project.id,
            colors: group.colors,
            name: group.project.name.clone(),
            hours: group.hours,
            percent: hours_percentage(group.hours, total_hours),
        })
        .collect::<Vec<_>>();
    summary.sort_by(|a, b| a.name.cmp(&b.name));
    summary
}

/// Loads the entries of `date` and builds its report.
pub async fn day_report(store: &dyn Store, user: &User, date: NaiveDate) -> Result<DayReport> {
    let entries = store
        .tracked_times_on(user.id, date)
        .await
        .with_context(|| format!("Failed to load tracked time of {date}"))?;
    debug!("Building report of {date} from {} entries", entries.len());
    Ok(build_report(&entries)?)
}
