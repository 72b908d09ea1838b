//! Route handlers for categories.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    AppState, Error,
    category::{Category, NewCategory},
    database_id::UserId,
};

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(new_category): Json<NewCategory>,
) -> Result<(StatusCode, Json<Category>), Error> {
    state
        .ledger
        .create_category(user_id, new_category)
        .map(|category| (StatusCode::CREATED, Json(category)))
}

/// A route handler for listing the user's categories.
pub async fn list_categories_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<Category>>, Error> {
    state.ledger.list_categories(user_id).map(Json)
}
