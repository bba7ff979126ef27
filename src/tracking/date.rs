use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{error, warn};

use crate::{
    storage::{
        entities::{User, UserId},
        store::{Store, StoreResult},
    },
    utils::{
        clock::Clock,
        time::{day_bounds, parse_date},
    },
};

/// Day bucket of a user together with the timezone it was resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDay {
    pub date: NaiveDate,
    /// [Tz::UTC] whenever the user has no usable timezone.
    pub tz: Tz,
}

impl ResolvedDay {
    /// Instants at which the day starts and ends in the resolved timezone.
    pub fn bounds(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        day_bounds(self.date, &self.tz)
    }
}

/// Resolves the calendar day for `date`, or for `now` when no date is given, in the user's
/// timezone. Never fails: a missing or malformed timezone falls back to UTC and an unparseable
/// date falls back to the current day. Timezone fallbacks log at error level, date fallbacks at
/// warn level.
pub fn resolve_date(
    now: DateTime<Utc>,
    user_id: UserId,
    timezone: Option<&str>,
    date: Option<&str>,
) -> ResolvedDay {
    let tz = match timezone {
        Some(name) => match name.parse::<Tz>() {
            Ok(tz) => tz,
            Err(e) => {
                error!("Invalid tz {name:?} for user {user_id}: {e}");
                Tz::UTC
            }
        },
        None => {
            error!("Missing tz for user {user_id}");
            Tz::UTC
        }
    };

    let today = now.with_timezone(&tz).date_naive();
    let date = match date {
        None => today,
        Some(value) => parse_date(value).unwrap_or_else(|| {
            warn!("Unparseable date {value:?} for user {user_id}, using {today}");
            today
        }),
    };

    ResolvedDay { date, tz }
}

/// Loads the user's timezone and resolves the day. Only storage failures are returned.
pub async fn resolve_user_date(
    store: &dyn Store,
    clock: &dyn Clock,
    user: &User,
    date: Option<&str>,
) -> StoreResult<ResolvedDay> {
    let timezone = store.user_timezone(user.id).await?;
    Ok(resolve_date(clock.time(), user.id, timezone.as_deref(), date))
}
