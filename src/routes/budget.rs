//! Route handlers for budgets.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{HeaderName, StatusCode, header::LOCATION},
};

use crate::{
    AppState, Error,
    budget::{Budget, NewBudget},
    budget_tracker::ConsistencyWarning,
    database_id::{BudgetId, UserId},
    endpoints::{self, format_endpoint},
};

/// A route handler for creating a new budget.
///
/// The `Location` header points at the new budget.
pub async fn create_budget_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(new_budget): Json<NewBudget>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<Budget>), Error> {
    state
        .ledger
        .create_budget(user_id, new_budget)
        .map(|budget| {
            let location = format_endpoint(endpoints::BUDGET, budget.id);
            (StatusCode::CREATED, [(LOCATION, location)], Json(budget))
        })
}

/// A route handler for listing the user's budgets.
pub async fn list_budgets_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<Budget>>, Error> {
    state.ledger.list_budgets(user_id).map(Json)
}

/// A route handler for deleting a budget.
///
/// Responds with 404 if the budget belongs to another user.
pub async fn delete_budget_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(budget_id): Path<BudgetId>,
) -> Result<StatusCode, Error> {
    state
        .ledger
        .delete_budget(user_id, budget_id)
        .map(|_| StatusCode::NO_CONTENT)
}

/// A route handler for checking a budget's spent amount against its expenses.
///
/// Responds with `null` when the budget is consistent.
pub async fn check_budget_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(budget_id): Path<BudgetId>,
) -> Result<Json<Option<ConsistencyWarning>>, Error> {
    state.ledger.check_budget(user_id, budget_id).map(Json)
}

#[cfg(test)]
mod budget_endpoint_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        budget::Budget,
        category::Category,
        endpoints::{self, format_endpoint},
        routes::test_utils::{get_test_server, user, user_header},
    };

    async fn create_food_budget(server: &TestServer) -> Budget {
        let category = server
            .post(endpoints::CATEGORIES)
            .add_header(user_header(), user(1))
            .json(&json!({ "name": "Food", "type": "expense" }))
            .await
            .json::<Category>();

        server
            .post(endpoints::BUDGETS)
            .add_header(user_header(), user(1))
            .json(&json!({
                "category_id": category.id,
                "amount": 100.0,
                "start_date": "2025-01-01",
                "end_date": "2025-01-31",
            }))
            .await
            .json::<Budget>()
    }

    #[tokio::test]
    async fn inverted_budget_window_is_bad_request() {
        let server = get_test_server();
        let budget = create_food_budget(&server).await;

        server
            .post(endpoints::BUDGETS)
            .add_header(user_header(), user(1))
            .json(&json!({
                "category_id": budget.category_id,
                "amount": 10.0,
                "start_date": "2025-02-01",
                "end_date": "2025-01-01",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_budget_sets_location() {
        let server = get_test_server();
        let category = server
            .post(endpoints::CATEGORIES)
            .add_header(user_header(), user(1))
            .json(&json!({ "name": "Food", "type": "expense" }))
            .await
            .json::<Category>();

        let response = server
            .post(endpoints::BUDGETS)
            .add_header(user_header(), user(1))
            .json(&json!({
                "category_id": category.id,
                "amount": 100.0,
                "start_date": "2025-01-01",
                "end_date": "2025-01-31",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let budget = response.json::<Budget>();
        assert_eq!(
            response.header("location").to_str().unwrap(),
            format_endpoint(endpoints::BUDGET, budget.id)
        );
    }

    #[tokio::test]
    async fn delete_budget_checks_owner() {
        let server = get_test_server();
        let budget = create_food_budget(&server).await;
        let path = format_endpoint(endpoints::BUDGET, budget.id);

        server
            .delete(&path)
            .add_header(user_header(), user(2))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .delete(&path)
            .add_header(user_header(), user(1))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete(&path)
            .add_header(user_header(), user(1))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn consistency_check_reports_drift() {
        let server = get_test_server();
        let budget = create_food_budget(&server).await;
        let path = format_endpoint(endpoints::BUDGET_CONSISTENCY, budget.id);

        let consistent = server
            .get(&path)
            .add_header(user_header(), user(1))
            .await
            .json::<Value>();
        assert_eq!(consistent, Value::Null);

        // A budget created after the expense starts with nothing spent.
        server
            .post(endpoints::TRANSACTIONS)
            .add_header(user_header(), user(1))
            .json(&json!({
                "amount": 25.0,
                "type": "expense",
                "category_id": budget.category_id,
                "timestamp": "2025-01-20T12:00:00Z",
            }))
            .await
            .assert_status(StatusCode::CREATED);
        let late_budget = server
            .post(endpoints::BUDGETS)
            .add_header(user_header(), user(1))
            .json(&json!({
                "category_id": budget.category_id,
                "amount": 50.0,
                "start_date": "2025-01-15",
                "end_date": "2025-01-25",
            }))
            .await
            .json::<Budget>();

        let warning = server
            .get(&format_endpoint(endpoints::BUDGET_CONSISTENCY, late_budget.id))
            .add_header(user_header(), user(1))
            .await
            .json::<Value>();

        assert_eq!(warning["recorded_spent"], 0.0);
        assert_eq!(warning["expected_spent"], 25.0);
    }
}
