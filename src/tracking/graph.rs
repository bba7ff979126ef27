use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::{
    entities::{ProjectHours, User},
    store::{Store, StoreResult},
};

/// Data of the dashboard chart: hours per project of one day, ordered by project name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub g: Vec<ProjectHours>,
}

pub async fn aggregate(store: &dyn Store, user: &User, date: NaiveDate) -> StoreResult<Graph> {
    let g = store.project_hours_on(user.id, date).await?;
    debug!("Graph of {date} for user {} has {} projects", user.id, g.len());
    Ok(Graph { g })
}
