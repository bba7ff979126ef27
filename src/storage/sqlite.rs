use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::{debug, info};

use super::{
    entities::{
        Credentials, Message, NewTrackedTime, Project, ProjectHours, ProjectId, TrackedTime,
        TrackedTimeWithProject, User, UserId,
    },
    store::{Store, StoreError, StoreResult, UniqueField},
};

/// The main realization of [Store].
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `database_url` and applies pending migrations.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to an in-memory database is a separate database, so the pool has to
        // keep exactly one alive.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.migrate().await?;
        info!("Connected to {database_url}");
        Ok(store)
    }

    pub async fn in_memory() -> StoreResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Finds out which unique column a rejected insert collided with.
    async fn conflicting_field(
        &self,
        username: &str,
        email: &str,
    ) -> StoreResult<Option<UniqueField>> {
        let (username_taken, email_taken) = sqlx::query_as::<_, (bool, bool)>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1),
                    EXISTS(SELECT 1 FROM users WHERE email = ?2)",
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(if username_taken {
            Some(UniqueField::Username)
        } else if email_taken {
            Some(UniqueField::Email)
        } else {
            None
        })
    }
}

#[derive(sqlx::FromRow)]
struct TrackedTimeRow {
    id: i64,
    user_id: UserId,
    project_id: ProjectId,
    hours: f64,
    activity: String,
    track_date: NaiveDate,
    manual_date: bool,
    project_name: String,
    project_color: String,
}

impl From<TrackedTimeRow> for TrackedTimeWithProject {
    fn from(row: TrackedTimeRow) -> Self {
        TrackedTimeWithProject {
            project: Project {
                id: row.project_id,
                user_id: row.user_id,
                name: row.project_name,
                color: row.project_color,
            },
            entry: TrackedTime {
                id: row.id,
                user_id: row.user_id,
                project_id: row.project_id,
                hours: row.hours,
                activity: row.activity,
                track_date: row.track_date,
                manual_date: row.manual_date,
            },
        }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<User> {
        let inserted = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)
             RETURNING id, username, email",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(user) => {
                info!("Created user {} with id {}", user.username, user.id);
                Ok(user)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                match self.conflicting_field(username, email).await? {
                    Some(field) => Err(StoreError::UniqueViolation { field }),
                    None => Err(sqlx::Error::Database(e).into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT id, username, email FROM users WHERE username = ?1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn credentials(&self, username: &str) -> StoreResult<Option<Credentials>> {
        Ok(sqlx::query_as::<_, Credentials>(
            "SELECT id AS user_id, password_hash FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_password_hash(&self, user_id: UserId, password_hash: &str) -> StoreResult<()> {
        sqlx::query("UPDATE users SET password_hash = ?1 WHERE id = ?2")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn user_timezone(&self, user_id: UserId) -> StoreResult<Option<String>> {
        Ok(
            sqlx::query_scalar::<_, String>("SELECT timezone FROM timezones WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn set_user_timezone(&self, user_id: UserId, timezone: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO timezones (user_id, timezone) VALUES (?1, ?2)
             ON CONFLICT (user_id) DO UPDATE SET timezone = excluded.timezone",
        )
        .bind(user_id)
        .bind(timezone)
        .execute(&self.pool)
        .await?;
        debug!("Timezone of user {user_id} set to {timezone}");
        Ok(())
    }

    async fn create_session(&self, user_id: UserId, token: &str) -> StoreResult<()> {
        sqlx::query("INSERT INTO sessions (token, user_id) VALUES (?1, ?2)")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn session_user(&self, token: &str) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>(
            "SELECT u.id, u.username, u.email
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_session(&self, token: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn push_message(&self, token: &str, message: Message) -> StoreResult<()> {
        sqlx::query("INSERT INTO messages (session_token, level, text) VALUES (?1, ?2, ?3)")
            .bind(token)
            .bind(message.level)
            .bind(&message.text)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn take_messages(&self, token: &str) -> StoreResult<Vec<Message>> {
        let mut tx = self.pool.begin().await?;
        let messages = sqlx::query_as::<_, Message>(
            "SELECT level, text FROM messages WHERE session_token = ?1 ORDER BY id",
        )
        .bind(token)
        .fetch_all(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM messages WHERE session_token = ?1")
            .bind(token)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(messages)
    }

    async fn create_project(
        &self,
        user_id: UserId,
        name: &str,
        color: &str,
    ) -> StoreResult<Project> {
        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO projects (user_id, name, color) VALUES (?1, ?2, ?3)
             RETURNING id, user_id, name, color",
        )
        .bind(user_id)
        .bind(name)
        .bind(color)
        .fetch_one(&self.pool)
        .await?;
        info!("Created project {} for user {user_id}", project.id);
        Ok(project)
    }

    async fn projects(&self, user_id: UserId) -> StoreResult<Vec<Project>> {
        Ok(sqlx::query_as::<_, Project>(
            "SELECT id, user_id, name, color FROM projects WHERE user_id = ?1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn project(
        &self,
        user_id: UserId,
        project_id: ProjectId,
    ) -> StoreResult<Option<Project>> {
        Ok(sqlx::query_as::<_, Project>(
            "SELECT id, user_id, name, color FROM projects WHERE id = ?1 AND user_id = ?2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_tracked_time(&self, entry: NewTrackedTime) -> StoreResult<TrackedTime> {
        let tracked = sqlx::query_as::<_, TrackedTime>(
            "INSERT INTO tracked_times (user_id, project_id, hours, activity, track_date, manual_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, user_id, project_id, hours, activity, track_date, manual_date",
        )
        .bind(entry.user_id)
        .bind(entry.project_id)
        .bind(entry.hours)
        .bind(&entry.activity)
        .bind(entry.track_date)
        .bind(entry.manual_date)
        .fetch_one(&self.pool)
        .await?;
        debug!("Inserted tracked time {:?}", tracked);
        Ok(tracked)
    }

    async fn tracked_times_on(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> StoreResult<Vec<TrackedTimeWithProject>> {
        let rows = sqlx::query_as::<_, TrackedTimeRow>(
            "SELECT t.id, t.user_id, t.project_id, t.hours, t.activity, t.track_date,
                    t.manual_date, p.name AS project_name, p.color AS project_color
             FROM tracked_times t JOIN projects p ON p.id = t.project_id
             WHERE t.user_id = ?1 AND t.track_date = ?2
             ORDER BY t.id",
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn project_hours_on(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> StoreResult<Vec<ProjectHours>> {
        Ok(sqlx::query_as::<_, ProjectHours>(
            "SELECT t.project_id AS project_id, p.name AS project_name,
                    p.color AS project_color, CAST(SUM(t.hours) AS REAL) AS hours
             FROM tracked_times t JOIN projects p ON p.id = t.project_id
             WHERE t.user_id = ?1 AND t.track_date = ?2
             GROUP BY t.project_id, p.name, p.color
             ORDER BY p.name, t.project_id",
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn tracked_dates(&self, user_id: UserId) -> StoreResult<Vec<NaiveDate>> {
        Ok(sqlx::query_scalar::<_, NaiveDate>(
            "SELECT DISTINCT track_date FROM tracked_times WHERE user_id = ?1
             ORDER BY track_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
