pub mod dashboard;
pub mod projects;
pub mod register;
pub mod report;
pub mod settings;
pub mod track;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::error::AppError;

/// Page re-rendered after a rejected form submission.
fn invalid<T: Serialize>(page: T) -> Result<Response, AppError> {
    Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(page)).into_response())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, HeaderMap, Method, Request, StatusCode},
        Router,
    };
    use chrono::{DateTime, Utc};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::{
        server::{build_router, AppState},
        storage::{entities::User, sqlite::SqliteStore, store::Store},
        utils::{clock::FixedClock, logging::TEST_LOGGING},
    };

    pub struct TestResponse {
        pub status: StatusCode,
        pub headers: HeaderMap,
        pub body: Vec<u8>,
    }

    impl TestResponse {
        pub fn json(&self) -> serde_json::Value {
            serde_json::from_slice(&self.body).unwrap()
        }

        pub fn location(&self) -> Option<&str> {
            self.headers
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
        }

        /// `name=value` part of the `Set-Cookie` header, ready to be sent back.
        pub fn cookie(&self) -> Option<String> {
            self.headers
                .get(header::SET_COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(';').next())
                .map(str::to_string)
        }
    }

    pub struct TestApp {
        pub router: Router,
        pub store: Arc<SqliteStore>,
    }

    impl TestApp {
        pub async fn new(now: DateTime<Utc>) -> Self {
            *TEST_LOGGING;
            let store = Arc::new(SqliteStore::in_memory().await.unwrap());
            let state = AppState::new(store.clone(), Arc::new(FixedClock(now)));
            Self {
                router: build_router(state),
                store,
            }
        }

        /// Creates a user with a session directly in the store, skipping password hashing.
        pub async fn user(&self, username: &str) -> (User, String) {
            let user = self
                .store
                .create_user(username, &format!("{username}@example.com"), "unused")
                .await
                .unwrap();
            let token = format!("token-{username}");
            self.store.create_session(user.id, &token).await.unwrap();
            (user, format!("tracktime_session={token}"))
        }

        pub async fn send(
            &self,
            method: Method,
            uri: &str,
            cookie: Option<&str>,
            form: Option<&str>,
            headers: &[(&str, &str)],
        ) -> TestResponse {
            let mut request = Request::builder().method(method).uri(uri);
            if let Some(cookie) = cookie {
                request = request.header(header::COOKIE, cookie);
            }
            for (name, value) in headers {
                request = request.header(*name, *value);
            }
            let body = match form {
                Some(form) => {
                    request = request.header(
                        header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    );
                    Body::from(form.to_string())
                }
                None => Body::empty(),
            };

            let response = self
                .router
                .clone()
                .oneshot(request.body(body).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .into_body()
                .collect()
                .await
                .unwrap()
                .to_bytes()
                .to_vec();
            TestResponse {
                status,
                headers,
                body,
            }
        }

        pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
            self.send(Method::GET, uri, cookie, None, &[]).await
        }

        pub async fn post(&self, uri: &str, cookie: Option<&str>, form: &str) -> TestResponse {
            self.send(Method::POST, uri, cookie, Some(form), &[]).await
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;

    use super::test_support::TestApp;

    #[tokio::test]
    async fn test_login_required_pages_redirect() {
        let app = TestApp::new(Utc::now()).await;
        for uri in ["/settings", "/dashboard", "/projects", "/add", "/report/2023/3/15"] {
            let response = app.get(uri, None).await;
            assert_eq!(response.status, StatusCode::SEE_OTHER, "{uri}");
            assert_eq!(response.location(), Some("/register"), "{uri}");
        }

        let response = app
            .get("/projects", Some("tracktime_session=unknown"))
            .await;
        assert_eq!(response.location(), Some("/register"));
    }

    #[tokio::test]
    async fn test_root_redirects_to_dashboard() {
        let app = TestApp::new(Utc::now()).await;
        let response = app.get("/", None).await;
        assert_eq!(response.location(), Some("/dashboard"));
    }
}
