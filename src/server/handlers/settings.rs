use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;
use tracing::info;

use crate::{
    auth::{hash_password_blocking, verify_password_blocking},
    server::{
        error::AppError,
        forms::{FormErrors, PasswordChange, SettingsForm},
        session::CurrentUser,
        AppState,
    },
    storage::entities::Message,
};

use super::invalid;

const SETTINGS_PATH: &str = "/settings";

#[derive(Debug, Default, Serialize)]
pub struct SettingsPage {
    pub timezone: Option<String>,
    pub messages: Vec<Message>,
    pub password_errors: FormErrors,
    pub tz_errors: FormErrors,
}

async fn page(
    state: &AppState,
    current: &CurrentUser,
    password_errors: FormErrors,
    tz_errors: FormErrors,
) -> Result<SettingsPage, AppError> {
    Ok(SettingsPage {
        timezone: state.store.user_timezone(current.user.id).await?,
        messages: current.take_messages(state).await?,
        password_errors,
        tz_errors,
    })
}

pub async fn settings_page(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<SettingsPage>, AppError> {
    Ok(Json(
        page(&state, &current, FormErrors::default(), FormErrors::default()).await?,
    ))
}

pub async fn settings_submit(
    State(state): State<AppState>,
    current: CurrentUser,
    Form(form): Form<SettingsForm>,
) -> Result<Response, AppError> {
    match form.action.as_str() {
        "password" => {
            let errors = match form.password_change() {
                Ok(change) => match change_password(&state, &current, change).await? {
                    None => return Ok(Redirect::to(SETTINGS_PATH).into_response()),
                    Some(errors) => errors,
                },
                Err(errors) => errors,
            };
            invalid(page(&state, &current, errors, FormErrors::default()).await?)
        }
        "tz" => match form.timezone() {
            Ok(tz) => {
                state
                    .store
                    .set_user_timezone(current.user.id, tz.name())
                    .await?;
                current
                    .flash(&state, Message::success(format!("Timezone set to {}", tz.name())))
                    .await?;
                Ok(Redirect::to(SETTINGS_PATH).into_response())
            }
            Err(errors) => invalid(page(&state, &current, FormErrors::default(), errors).await?),
        },
        _ => Ok(Json(
            page(&state, &current, FormErrors::default(), FormErrors::default()).await?,
        )
        .into_response()),
    }
}

/// Returns field errors when the old password doesn't match.
async fn change_password(
    state: &AppState,
    current: &CurrentUser,
    change: PasswordChange,
) -> Result<Option<FormErrors>, AppError> {
    let hash = state
        .store
        .credentials(&current.user.username)
        .await?
        .map(|credentials| credentials.password_hash)
        .unwrap_or_default();

    if !verify_password_blocking(change.old_password, hash).await? {
        return Ok(Some(FormErrors::single("old_password", "Wrong old password")));
    }

    let new_hash = hash_password_blocking(change.new_password).await?;
    state
        .store
        .set_password_hash(current.user.id, &new_hash)
        .await?;
    info!("Changed password of user {}", current.user.id);
    current
        .flash(state, Message::success("Password was changed."))
        .await?;
    Ok(None)
}
