//! Route handlers for transactions.

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{
        HeaderName, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
};
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    database_id::{CategoryId, UserId},
    transaction::{Transaction, TransactionType},
};

/// The request body for recording a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionData {
    /// The amount of money spent or earned.
    pub amount: f64,
    /// Whether this is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The category of the transaction, if any.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// What the transaction was for.
    #[serde(default)]
    pub description: String,
    /// When the transaction happened, defaults to now.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

/// Optional date filter for listing transactions.
///
/// Both dates must be given for the filter to apply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    /// The first day to include.
    pub start_date: Option<Date>,
    /// The last day to include.
    pub end_date: Option<Date>,
}

/// The request body for exporting transactions.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    /// The first day to include.
    pub start_date: Date,
    /// The last day to include.
    pub end_date: Date,
}

/// A route handler for recording a new transaction.
///
/// The budgets the transaction falls under are updated as part of the request.
pub async fn create_transaction_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(data): Json<TransactionData>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let mut builder = Transaction::build(data.amount, data.transaction_type)
        .category_id(data.category_id)
        .description(&data.description);

    if let Some(timestamp) = data.timestamp {
        builder = builder.timestamp(timestamp);
    }

    state
        .ledger
        .record_transaction(user_id, builder)
        .map(|transaction| (StatusCode::CREATED, Json(transaction)))
}

/// A route handler for listing the user's transactions.
///
/// Without a date filter all transactions are returned, newest first. With a
/// filter, the transactions in the range are returned oldest first.
pub async fn list_transactions_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Query(filter): Query<TransactionFilter>,
) -> Result<Json<Vec<Transaction>>, Error> {
    match (filter.start_date, filter.end_date) {
        (Some(start_date), Some(end_date)) => state
            .ledger
            .transactions_in_range(user_id, start_date, end_date),
        _ => state.ledger.list_transactions(user_id),
    }
    .map(Json)
}

/// A route handler for downloading the user's transactions in a date range
/// as a CSV attachment.
pub async fn export_transactions_endpoint(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(request): Json<ExportRequest>,
) -> Result<([(HeaderName, &'static str); 2], Vec<u8>), Error> {
    let csv = state
        .ledger
        .export_transactions(user_id, request.start_date, request.end_date)?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv,
    ))
}

#[cfg(test)]
mod transaction_endpoint_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        budget::Budget,
        category::Category,
        endpoints,
        routes::test_utils::{get_test_server, user, user_header},
        transaction::{Transaction, TransactionType},
    };

    #[tokio::test]
    async fn recording_expense_updates_budget() {
        let server = get_test_server();
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
                "end_date": "2025-01-10",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post(endpoints::TRANSACTIONS)
            .add_header(user_header(), user(1))
            .json(&json!({
                "amount": 30.0,
                "type": "expense",
                "category_id": category.id,
                "description": "Groceries",
                "timestamp": "2025-01-05T10:00:00Z",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction = response.json::<Transaction>();
        assert_eq!(transaction.transaction_type, TransactionType::Expense);
        assert_eq!(transaction.description, "Groceries");

        let budgets = server
            .get(endpoints::BUDGETS)
            .add_header(user_header(), user(1))
            .await
            .json::<Vec<Budget>>();
        assert_eq!(budgets[0].spent, 30.0);
    }

    #[tokio::test]
    async fn negative_amount_is_bad_request() {
        let server = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .add_header(user_header(), user(1))
            .json(&json!({ "amount": -1.0, "type": "income" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_category_is_not_found() {
        let server = get_test_server();

        server
            .post(endpoints::TRANSACTIONS)
            .add_header(user_header(), user(1))
            .json(&json!({ "amount": 1.0, "type": "expense", "category_id": 99 }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_filters_by_date_range() {
        let server = get_test_server();
        for timestamp in ["2025-01-01T00:00:00Z", "2025-01-15T00:00:00Z"] {
            server
                .post(endpoints::TRANSACTIONS)
                .add_header(user_header(), user(1))
                .json(&json!({ "amount": 1.0, "type": "income", "timestamp": timestamp }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let all = server
            .get(endpoints::TRANSACTIONS)
            .add_header(user_header(), user(1))
            .await
            .json::<Vec<Transaction>>();
        let filtered = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("start_date", "2025-01-10")
            .add_query_param("end_date", "2025-01-31")
            .add_header(user_header(), user(1))
            .await
            .json::<Vec<Transaction>>();

        assert_eq!(all.len(), 2);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0], all[0]);
    }

    #[tokio::test]
    async fn export_labels_uncategorized_rows() {
        let server = get_test_server();
        let category = server
            .post(endpoints::CATEGORIES)
            .add_header(user_header(), user(1))
            .json(&json!({ "name": "Food", "type": "expense" }))
            .await
            .json::<Category>();
        for (category_id, description) in [(Some(category.id), "Groceries"), (None, "Cash")] {
            server
                .post(endpoints::TRANSACTIONS)
                .add_header(user_header(), user(1))
                .json(&json!({
                    "amount": 7.25,
                    "type": "expense",
                    "category_id": category_id,
                    "description": description,
                    "timestamp": "2025-01-05T10:00:00Z",
                }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server
            .post(endpoints::TRANSACTIONS_EXPORT)
            .add_header(user_header(), user(1))
            .json(&json!({ "start_date": "2025-01-01", "end_date": "2025-01-31" }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("content-type").to_str().unwrap(), "text/csv");
        assert_eq!(
            response.text(),
            "date,type,category,amount,description\n\
             2025-01-05 10:00,expense,Food,7.25,Groceries\n\
             2025-01-05 10:00,expense,Uncategorized,7.25,Cash\n"
        );
    }

    #[tokio::test]
    async fn export_only_includes_own_transactions() {
        let server = get_test_server();
        server
            .post(endpoints::TRANSACTIONS)
            .add_header(user_header(), user(2))
            .json(&json!({ "amount": 1.0, "type": "income", "timestamp": "2025-01-05T10:00:00Z" }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post(endpoints::TRANSACTIONS_EXPORT)
            .add_header(user_header(), user(1))
            .json(&json!({ "start_date": "2025-01-01", "end_date": "2025-01-31" }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), "date,type,category,amount,description\n");
    }
}
