use axum::{
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    auth::{hash_password_blocking, new_session_token, verify_password_blocking},
    server::{
        error::AppError,
        forms::{FormErrors, Login, RegisterForm, Registration},
        session::{
            expired_session_cookie, session_cookie, CurrentUser, LOGIN_PATH,
        },
        AppState,
    },
    storage::{
        entities::UserId,
        store::{StoreError, UniqueField},
    },
};

use super::invalid;

const AFTER_LOGIN_PATH: &str = "/dashboard";

#[derive(Debug, Default, Serialize)]
pub struct RegisterPage {
    pub register_errors: FormErrors,
    pub login_errors: FormErrors,
}

pub async fn register_page() -> Json<RegisterPage> {
    Json(RegisterPage::default())
}

pub async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    match form.action.as_str() {
        "register" => {
            let result = match form.registration() {
                Ok(registration) => register(&state, registration).await?,
                Err(errors) => Err(errors),
            };
            match result {
                Ok(user_id) => start_session(&state, user_id).await,
                Err(register_errors) => invalid(RegisterPage {
                    register_errors,
                    ..Default::default()
                }),
            }
        }
        "login" => {
            let result = match form.login() {
                Ok(login) => authenticate(&state, login).await?,
                Err(errors) => Err(errors),
            };
            match result {
                Ok(user_id) => start_session(&state, user_id).await,
                Err(login_errors) => invalid(RegisterPage {
                    login_errors,
                    ..Default::default()
                }),
            }
        }
        _ => Ok(Json(RegisterPage::default()).into_response()),
    }
}

/// Creates the account. Taken usernames and emails come back as field errors.
async fn register(
    state: &AppState,
    registration: Registration,
) -> Result<Result<UserId, FormErrors>, AppError> {
    let hash = hash_password_blocking(registration.password).await?;
    match state
        .store
        .create_user(&registration.username, &registration.email, &hash)
        .await
    {
        Ok(user) => {
            info!("Registered user {}", user.id);
            Ok(Ok(user.id))
        }
        Err(StoreError::UniqueViolation { field }) => {
            let errors = match field {
                UniqueField::Username => FormErrors::single("username", "Username is taken"),
                UniqueField::Email => FormErrors::single("email", "Email is already registered"),
            };
            Ok(Err(errors))
        }
        Err(e) => Err(e.into()),
    }
}

async fn authenticate(
    state: &AppState,
    login: Login,
) -> Result<Result<UserId, FormErrors>, AppError> {
    let wrong_credentials = || FormErrors::single("username", "Wrong credentials");

    let Some(credentials) = state.store.credentials(&login.username).await? else {
        warn!("Login attempt for unknown user");
        return Ok(Err(wrong_credentials()));
    };
    if !verify_password_blocking(login.password, credentials.password_hash).await? {
        warn!("Wrong password for user {}", credentials.user_id);
        return Ok(Err(wrong_credentials()));
    }
    Ok(Ok(credentials.user_id))
}

async fn start_session(state: &AppState, user_id: UserId) -> Result<Response, AppError> {
    let token = new_session_token();
    state.store.create_session(user_id, &token).await?;
    info!("Started session for user {user_id}");
    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token))]),
        Redirect::to(AFTER_LOGIN_PATH),
    )
        .into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Response, AppError> {
    state.store.delete_session(&current.token).await?;
    info!("Ended session of user {}", current.user.id);
    Ok((
        AppendHeaders([(header::SET_COOKIE, expired_session_cookie())]),
        Redirect::to(LOGIN_PATH),
    )
        .into_response())
}
