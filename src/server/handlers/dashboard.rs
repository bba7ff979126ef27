use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    server::{error::AppError, session::CurrentUser, AppState},
    storage::entities::Message,
    tracking::{
        date::resolve_user_date,
        graph::{aggregate, Graph},
    },
    utils::time::short_date,
};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub graph: Graph,
    pub dates: Vec<String>,
    pub selected_date: String,
    pub today_date: String,
    pub messages: Vec<Message>,
}

fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .is_some_and(|value| value.as_bytes() == b"XMLHttpRequest")
}

/// Tracked dates with `today` in front unless it already leads the list.
fn dashboard_dates(mut tracked: Vec<NaiveDate>, today: NaiveDate) -> Vec<NaiveDate> {
    if tracked.first() != Some(&today) {
        tracked.insert(0, today);
    }
    tracked
}

pub async fn dashboard_page(
    State(state): State<AppState>,
    current: CurrentUser,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, AppError> {
    let store = &*state.store;
    let clock = &*state.clock;

    let day = resolve_user_date(store, clock, &current.user, query.date.as_deref()).await?;
    let graph = aggregate(store, &current.user, day.date).await?;
    if is_ajax(&headers) {
        return Ok(Json(graph).into_response());
    }

    let today = clock.time().with_timezone(&day.tz).date_naive();
    let dates = dashboard_dates(store.tracked_dates(current.user.id).await?, today);

    Ok(Json(DashboardPage {
        graph,
        dates: dates.into_iter().map(short_date).collect(),
        selected_date: short_date(day.date),
        today_date: short_date(today),
        messages: current.take_messages(&state).await?,
    })
    .into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    use crate::{
        server::handlers::test_support::TestApp,
        storage::{entities::NewTrackedTime, store::Store},
    };

    use super::dashboard_dates;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_today_is_prepended_once() {
        let today = ymd(2023, 3, 16);
        assert_eq!(
            dashboard_dates(vec![ymd(2023, 3, 15)], today),
            vec![today, ymd(2023, 3, 15)]
        );
        assert_eq!(
            dashboard_dates(vec![today, ymd(2023, 3, 15)], today),
            vec![today, ymd(2023, 3, 15)]
        );
        assert_eq!(dashboard_dates(vec![], today), vec![today]);
    }

    async fn seed(app: &TestApp, user_id: i64, date: NaiveDate) -> i64 {
        let project = app
            .store
            .create_project(user_id, "Garden", "#00ff00")
            .await
            .unwrap();
        for hours in [1.5, 2.] {
            app.store
                .insert_tracked_time(NewTrackedTime {
                    user_id,
                    project_id: project.id,
                    hours,
                    activity: "weeding".into(),
                    track_date: date,
                    manual_date: true,
                })
                .await
                .unwrap();
        }
        project.id
    }

    #[tokio::test]
    async fn test_ajax_returns_graph_json() {
        let app = TestApp::new(Utc::now()).await;
        let (user, cookie) = app.user("alice").await;
        let project_id = seed(&app, user.id, ymd(2023, 3, 15)).await;

        let response = app
            .send(
                Method::GET,
                "/dashboard?date=2023-03-15",
                Some(&cookie),
                None,
                &[("X-Requested-With", "XMLHttpRequest")],
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.json(),
            json!({"g": [{
                "project": project_id,
                "project__name": "Garden",
                "project__color": "#00ff00",
                "hours": 3.5,
            }]})
        );
    }

    #[tokio::test]
    async fn test_ajax_without_date_uses_today() {
        let now = Utc.with_ymd_and_hms(2023, 3, 16, 2, 0, 0).unwrap();
        let app = TestApp::new(now).await;
        let (user, cookie) = app.user("alice").await;
        app.store
            .set_user_timezone(user.id, "America/New_York")
            .await
            .unwrap();
        seed(&app, user.id, ymd(2023, 3, 15)).await;

        let response = app
            .send(
                Method::GET,
                "/dashboard",
                Some(&cookie),
                None,
                &[("X-Requested-With", "XMLHttpRequest")],
            )
            .await;
        assert_eq!(response.json()["g"][0]["hours"], 3.5);
    }

    #[tokio::test]
    async fn test_page_lists_dates() {
        let now = Utc.with_ymd_and_hms(2023, 3, 20, 12, 0, 0).unwrap();
        let app = TestApp::new(now).await;
        let (user, cookie) = app.user("alice").await;
        seed(&app, user.id, ymd(2023, 3, 15)).await;

        let page = app.get("/dashboard", Some(&cookie)).await.json();
        assert_eq!(page["dates"], json!(["03/20/2023", "03/15/2023"]));
        assert_eq!(page["today_date"], "03/20/2023");
        assert_eq!(page["selected_date"], "03/20/2023");
        assert_eq!(page["graph"]["g"], json!([]));
    }

    #[tokio::test]
    async fn test_page_shows_requested_date() {
        let now = Utc.with_ymd_and_hms(2023, 3, 20, 12, 0, 0).unwrap();
        let app = TestApp::new(now).await;
        let (user, cookie) = app.user("alice").await;
        let project_id = seed(&app, user.id, ymd(2023, 3, 15)).await;

        let page = app
            .get("/dashboard?date=2023-03-15", Some(&cookie))
            .await
            .json();
        assert_eq!(page["selected_date"], "03/15/2023");
        assert_eq!(page["today_date"], "03/20/2023");
        assert_eq!(page["dates"], json!(["03/20/2023", "03/15/2023"]));
        assert_eq!(
            page["graph"]["g"],
            json!([{
                "project": project_id,
                "project__name": "Garden",
                "project__color": "#00ff00",
                "hours": 3.5,
            }])
        );

        let page = app
            .get("/dashboard?date=someday", Some(&cookie))
            .await
            .json();
        assert_eq!(page["selected_date"], "03/20/2023");
        assert_eq!(page["graph"]["g"], json!([]));
    }
}
