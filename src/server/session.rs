use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};

use crate::storage::entities::{Message, User};

use super::{error::AppError, AppState};

pub const SESSION_COOKIE: &str = "tracktime_session";

/// Where anonymous visitors of login-required pages are sent.
pub const LOGIN_PATH: &str = "/register";

/// Authenticated user of a request. Extracting it from a request without a valid session
/// redirects to [LOGIN_PATH].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

impl CurrentUser {
    /// Queues a message shown on the next page view of this session.
    pub async fn flash(&self, state: &AppState, message: Message) -> Result<(), AppError> {
        state.store.push_message(&self.token, message).await?;
        Ok(())
    }

    pub async fn take_messages(&self, state: &AppState) -> Result<Vec<Message>, AppError> {
        Ok(state.store.take_messages(&self.token).await?)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Err(Redirect::to(LOGIN_PATH).into_response());
        };

        match state.store.session_user(&token).await {
            Ok(Some(user)) => Ok(CurrentUser { user, token }),
            Ok(None) => Err(Redirect::to(LOGIN_PATH).into_response()),
            Err(e) => Err(AppError::from(e).into_response()),
        }
    }
}

/// Reads the session token out of the `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
