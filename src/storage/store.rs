use std::{fmt::Display, sync::Arc};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::entities::{
    Credentials, Message, NewTrackedTime, Project, ProjectHours, ProjectId, TrackedTime,
    TrackedTimeWithProject, User, UserId,
};

/// Column of the `users` table that carries a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UniqueField::Username => write!(f, "username"),
            UniqueField::Email => write!(f, "email"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("value of {field} is already taken")]
    UniqueViolation { field: UniqueField },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to apply migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Interface for abstracting persistence of users, projects and tracked time. Every query that
/// reads user owned data takes the user id explicitly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Creates a user. Fails with [StoreError::UniqueViolation] when the username or email is
    /// already registered.
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<User>;

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn credentials(&self, username: &str) -> StoreResult<Option<Credentials>>;

    async fn set_password_hash(&self, user_id: UserId, password_hash: &str) -> StoreResult<()>;

    /// Returns the configured IANA timezone name, if any. The value is not validated.
    async fn user_timezone(&self, user_id: UserId) -> StoreResult<Option<String>>;

    /// Creates the timezone setting or overwrites the existing one.
    async fn set_user_timezone(&self, user_id: UserId, timezone: &str) -> StoreResult<()>;

    async fn create_session(&self, user_id: UserId, token: &str) -> StoreResult<()>;

    async fn session_user(&self, token: &str) -> StoreResult<Option<User>>;

    async fn delete_session(&self, token: &str) -> StoreResult<()>;

    async fn push_message(&self, token: &str, message: Message) -> StoreResult<()>;

    /// Returns queued messages in insertion order and removes them.
    async fn take_messages(&self, token: &str) -> StoreResult<Vec<Message>>;

    async fn create_project(&self, user_id: UserId, name: &str, color: &str)
        -> StoreResult<Project>;

    async fn projects(&self, user_id: UserId) -> StoreResult<Vec<Project>>;

    /// Returns the project only when it belongs to `user_id`.
    async fn project(&self, user_id: UserId, project_id: ProjectId)
        -> StoreResult<Option<Project>>;

    async fn insert_tracked_time(&self, entry: NewTrackedTime) -> StoreResult<TrackedTime>;

    /// Entries of a single day ordered by id, joined with their projects.
    async fn tracked_times_on(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> StoreResult<Vec<TrackedTimeWithProject>>;

    /// Hours summed per project for a single day, ordered by project name.
    async fn project_hours_on(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> StoreResult<Vec<ProjectHours>>;

    /// Distinct days with tracked time, newest first.
    async fn tracked_dates(&self, user_id: UserId) -> StoreResult<Vec<NaiveDate>>;
}

pub type SharedStore = Arc<dyn Store>;
