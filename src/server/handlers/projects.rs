use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::Datelike;
use serde::Serialize;
use tracing::info;

use crate::{
    server::{
        error::AppError,
        forms::{FormErrors, ProjectForm},
        session::CurrentUser,
        AppState,
    },
    storage::entities::{Message, Project},
    tracking::date::resolve_user_date,
};

use super::invalid;

pub const PROJECTS_PATH: &str = "/projects";

/// Link target of the day report for the user's current day.
#[derive(Debug, Serialize)]
pub struct ReportDate {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Serialize)]
pub struct ProjectsPage {
    pub objects: Vec<Project>,
    pub report_date: ReportDate,
    pub messages: Vec<Message>,
}

#[derive(Debug, Default, Serialize)]
pub struct AddPage {
    pub errors: FormErrors,
}

pub async fn projects_page(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<ProjectsPage>, AppError> {
    let today = resolve_user_date(&*state.store, &*state.clock, &current.user, None)
        .await?
        .date;

    Ok(Json(ProjectsPage {
        objects: state.store.projects(current.user.id).await?,
        report_date: ReportDate {
            day: today.day(),
            month: today.month(),
            year: today.year(),
        },
        messages: current.take_messages(&state).await?,
    }))
}

pub async fn add_page(_current: CurrentUser) -> Json<AddPage> {
    Json(AddPage::default())
}

pub async fn add_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    Form(form): Form<ProjectForm>,
) -> Result<Response, AppError> {
    let project = match form.project() {
        Ok(project) => project,
        Err(errors) => return invalid(AddPage { errors }),
    };

    let project = state
        .store
        .create_project(current.user.id, &project.name, &project.color)
        .await?;
    info!("User {} created project {}", current.user.id, project.id);
    Ok(Redirect::to(PROJECTS_PATH).into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{TimeZone, Utc};

    use crate::{server::handlers::test_support::TestApp, storage::store::Store};

    #[tokio::test]
    async fn test_add_project() {
        let app = TestApp::new(Utc::now()).await;
        let (user, cookie) = app.user("alice").await;

        let response = app
            .post("/add", Some(&cookie), "name=Garden&color=%2300ff00")
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/projects"));

        let projects = app.store.projects(user.id).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Garden");
        assert_eq!(projects[0].color, "#00ff00");
    }

    #[tokio::test]
    async fn test_add_project_requires_name() {
        let app = TestApp::new(Utc::now()).await;
        let (user, cookie) = app.user("alice").await;

        let response = app.post("/add", Some(&cookie), "name=+&color=").await;
        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.json()["errors"]["name"].is_array());
        assert!(app.store.projects(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_projects_page() {
        // Already the 16th in Tokyo.
        let now = Utc.with_ymd_and_hms(2023, 3, 15, 20, 0, 0).unwrap();
        let app = TestApp::new(now).await;
        let (user, cookie) = app.user("alice").await;
        let (bob, _) = app.user("bob").await;
        app.store
            .set_user_timezone(user.id, "Asia/Tokyo")
            .await
            .unwrap();
        app.store
            .create_project(user.id, "Garden", "#00ff00")
            .await
            .unwrap();
        app.store
            .create_project(bob.id, "Bob's", "#000000")
            .await
            .unwrap();

        let page = app.get("/projects", Some(&cookie)).await.json();
        let objects = page["objects"].as_array().unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["name"], "Garden");
        assert_eq!(page["report_date"]["day"], 16);
        assert_eq!(page["report_date"]["month"], 3);
        assert_eq!(page["report_date"]["year"], 2023);
    }
}
