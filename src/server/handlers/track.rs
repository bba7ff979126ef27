use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;
use tracing::info;

use crate::{
    server::{
        error::AppError,
        forms::{FormErrors, TrackTimeForm},
        params::ResourcePath,
        session::CurrentUser,
        AppState,
    },
    storage::entities::{Message, NewTrackedTime, Project, ProjectId},
    tracking::date::resolve_user_date,
};

use super::{invalid, projects::PROJECTS_PATH};

#[derive(Debug, Serialize)]
pub struct TrackPage {
    pub project: Project,
    pub errors: FormErrors,
}

async fn owned_project(
    state: &AppState,
    current: &CurrentUser,
    project_id: ProjectId,
) -> Result<Project, AppError> {
    state
        .store
        .project(current.user.id, project_id)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn track_page(
    State(state): State<AppState>,
    current: CurrentUser,
    ResourcePath(project_id): ResourcePath<ProjectId>,
) -> Result<Json<TrackPage>, AppError> {
    Ok(Json(TrackPage {
        project: owned_project(&state, &current, project_id).await?,
        errors: FormErrors::default(),
    }))
}

pub async fn track_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    ResourcePath(project_id): ResourcePath<ProjectId>,
    Form(form): Form<TrackTimeForm>,
) -> Result<Response, AppError> {
    let project = owned_project(&state, &current, project_id).await?;
    let track = match form.track_time() {
        Ok(track) => track,
        Err(errors) => return invalid(TrackPage { project, errors }),
    };

    let (track_date, manual_date) = match track.track_date {
        Some(date) => (date, true),
        None => {
            let today = resolve_user_date(&*state.store, &*state.clock, &current.user, None)
                .await?
                .date;
            (today, false)
        }
    };

    let entry = state
        .store
        .insert_tracked_time(NewTrackedTime {
            user_id: current.user.id,
            project_id: project.id,
            hours: track.hours,
            activity: track.activity,
            track_date,
            manual_date,
        })
        .await?;
    info!(
        "User {} tracked {} hours on project {}",
        current.user.id, entry.hours, project.id
    );

    current
        .flash(
            &state,
            Message::success(format!(
                "Added {} hours for {} at date {}",
                entry.hours, entry.activity, entry.track_date
            )),
        )
        .await?;
    Ok(Redirect::to(PROJECTS_PATH).into_response())
}
