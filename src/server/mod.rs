//! HTTP surface of the application. Handlers return JSON view-models; turning them into markup is
//! left to whatever renders the pages.

pub mod args;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod params;
pub mod session;
pub mod shutdown;

use std::sync::Arc;

use anyhow::{Context, Result};
use args::ServeArgs;
use axum::{
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::{Redirect, Response},
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument};

use crate::{
    storage::store::SharedStore,
    utils::clock::{Clock, DefaultClock},
};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: SharedStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route(
            "/settings",
            get(handlers::settings::settings_page).post(handlers::settings::settings_submit),
        )
        .route(
            "/report/{year}/{month}/{day}",
            get(handlers::report::report_page),
        )
        .route("/dashboard", get(handlers::dashboard::dashboard_page))
        .route("/projects", get(handlers::projects::projects_page))
        .route(
            "/add",
            get(handlers::projects::add_page).post(handlers::projects::add_submit),
        )
        .route(
            "/track/{project_id}",
            get(handlers::track::track_page).post(handlers::track::track_submit),
        )
        .route(
            "/register",
            get(handlers::register::register_page).post(handlers::register::register_submit),
        )
        .route("/logout", post(handlers::register::logout))
        .layer(middleware::from_fn(request_tracing_middleware))
        .with_state(state)
}

async fn request_tracing_middleware(request: Request<Body>, next: Next) -> Response {
    let span = tracing::info_span!(
        "http.request",
        method = %request.method(),
        route = %request.uri().path(),
    );
    let response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| info!(status = response.status().as_u16(), "Handled request"));
    response
}

/// Serves the application until a shutdown signal arrives.
pub async fn start_server(args: ServeArgs, store: SharedStore) -> Result<()> {
    let state = AppState::new(store, Arc::new(DefaultClock));
    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!("Listening on {}", listener.local_addr()?);

    let shutdown_token = CancellationToken::new();
    tokio::spawn(shutdown::detect_shutdown(shutdown_token.clone()));

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await
        .context("Server stopped with an error")?;
    info!("Server stopped");
    Ok(())
}
