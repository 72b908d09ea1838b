//! The JSON API over the ledger.
//!
//! Every route requires the [USER_ID_HEADER](crate::USER_ID_HEADER) header,
//! see [auth_guard].

mod budget;
mod category;
mod statistics;
mod transaction;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde_json::json;

use crate::{AppState, auth::auth_guard, endpoints};

use self::{
    budget::{
        check_budget_endpoint, create_budget_endpoint, delete_budget_endpoint,
        list_budgets_endpoint,
    },
    category::{create_category_endpoint, list_categories_endpoint},
    statistics::get_statistics_endpoint,
    transaction::{
        create_transaction_endpoint, export_transactions_endpoint, list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            endpoints::CATEGORIES,
            post(create_category_endpoint).get(list_categories_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            post(create_transaction_endpoint).get(list_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS_EXPORT,
            post(export_transactions_endpoint),
        )
        .route(
            endpoints::BUDGETS,
            post(create_budget_endpoint).get(list_budgets_endpoint),
        )
        .route(endpoints::BUDGET, delete(delete_budget_endpoint))
        .route(endpoints::BUDGET_CONSISTENCY, get(check_budget_endpoint))
        .route(endpoints::STATISTICS, post(get_statistics_endpoint))
        .route_layer(middleware::from_fn(auth_guard))
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "no such route" })),
    )
        .into_response()
}
