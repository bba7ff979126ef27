use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::AppError;

/// [Path] whose segments name a resource. Segments that don't parse point at nothing, so they are
/// answered with a 404 instead of axum's 400.
#[derive(Debug)]
pub struct ResourcePath<T>(pub T);

impl<T, S> FromRequestParts<S> for ResourcePath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ResourcePath(value)),
            Err(rejection) => {
                debug!("Unresolvable path {}: {rejection}", parts.uri.path());
                Err(AppError::NotFound)
            }
        }
    }
}
