use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type ProjectId = i64;

/// Color assigned to projects created without one.
pub const DEFAULT_PROJECT_COLOR: &str = "#337ab7";

/// Account data that is safe to pass around. The password hash lives in [Credentials] and is only
/// loaded for authentication.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Credentials {
    pub user_id: UserId,
    pub password_hash: String,
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Project {
    pub id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    pub color: String,
}

/// One logged record of hours spent on a project's activity during a calendar day.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct TrackedTime {
    pub id: i64,
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub hours: f64,
    pub activity: String,
    pub track_date: NaiveDate,
    /// `true` when the user picked the date, `false` when it was filled in from the current day.
    pub manual_date: bool,
}

#[derive(PartialEq, Debug, Clone)]
pub struct NewTrackedTime {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub hours: f64,
    pub activity: String,
    pub track_date: NaiveDate,
    pub manual_date: bool,
}

/// Tracked time entry together with the project it was logged against.
#[derive(PartialEq, Debug, Clone)]
pub struct TrackedTimeWithProject {
    pub entry: TrackedTime,
    pub project: Project,
}

/// Hours of a single project summed over a day. Field names on the wire are consumed by the
/// dashboard chart and must not change.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct ProjectHours {
    #[serde(rename = "project")]
    pub project_id: ProjectId,
    #[serde(rename = "project__name")]
    pub project_name: String,
    #[serde(rename = "project__color")]
    pub project_color: String,
    pub hours: f64,
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Error,
}

/// A one-shot message queued for a session and shown on the next page view.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            text: text.into(),
        }
    }
}
