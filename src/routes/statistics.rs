//! Route handler for statistics.

use axum::{Extension, Json, extract::State};

use crate::{
    AppState, Error,
    database_id::UserId,
    statistics::{Statistics, StatisticsQuery},
};

/// A route handler for computing statistics over a date range.
pub async fn get_statistics_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(query): Json<StatisticsQuery>,
) -> Result<Json<Statistics>, Error> {
    state.ledger.get_statistics(user_id, &query).map(Json)
}
