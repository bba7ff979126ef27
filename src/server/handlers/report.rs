use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    server::{error::AppError, params::ResourcePath, session::CurrentUser, AppState},
    tracking::day_report::{day_report, ProjectDetail, ProjectSummary},
};

#[derive(Debug, Serialize)]
pub struct ReportPage {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub report: Vec<ProjectSummary>,
    pub detailed: Vec<ProjectDetail>,
    pub total_hours: f64,
}

pub async fn report_page(
    State(state): State<AppState>,
    current: CurrentUser,
    ResourcePath((year, month, day)): ResourcePath<(i32, u32, u32)>,
) -> Result<Json<ReportPage>, AppError> {
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(AppError::NotFound)?;
    let report = day_report(&*state.store, &current.user, date).await?;

    Ok(Json(ReportPage {
        year,
        month,
        day,
        report: report.summary,
        detailed: report.detailed,
        total_hours: report.total_hours,
    }))
}
