//! Pennywise is the ledger engine of a personal finance tracker.
//!
//! Users record income and expense transactions against categories, set
//! budgets per category over a date window, and ask for statistics over a
//! date range. This library keeps budget consumption up to date as expenses
//! are recorded and computes category totals, daily totals and a gap-filled
//! balance history. Transactions in a date range can be exported as CSV. A
//! thin JSON API over the [Ledger] is provided by [build_router].

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use time::Date;
use tokio::signal;

mod app_state;
mod auth;
mod budget;
mod budget_tracker;
mod category;
mod config;
mod database_id;
mod date_range;
mod db;
mod endpoints;
mod export;
mod ledger;
mod logging;
mod routes;
mod statistics;
pub mod stores;
mod transaction;

pub use app_state::AppState;
pub use auth::{USER_ID_HEADER, auth_guard};
pub use budget::{Budget, NewBudget};
pub use budget_tracker::{BudgetConsumptionTracker, ConsistencyWarning, audit_budget};
pub use category::{Category, CategoryName, NewCategory};
pub use config::LedgerConfig;
pub use database_id::{BudgetId, CategoryId, DatabaseId, TransactionId, UserId};
pub use date_range::{DEFAULT_MAX_RANGE_DAYS, DateRange, days_in_range};
pub use db::initialize as initialize_db;
pub use export::{UNCATEGORIZED_LABEL, transactions_to_csv};
pub use ledger::Ledger;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routes::build_router;
pub use statistics::{
    CategoryTotal, DailyTotal, Statistics, StatisticsAggregator, StatisticsQuery, TotalKind,
    balance_history, category_totals, daily_totals,
};
pub use stores::sqlite::{SQLiteLedger, create_ledger};
pub use transaction::{Transaction, TransactionBuilder, TransactionType};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The end of a date range is before its start.
    #[error("the date range {start} to {end} ends before it starts")]
    InvalidDateRange {
        /// The first day of the rejected range.
        start: Date,
        /// The last day of the rejected range.
        end: Date,
    },

    /// A date range covers more days than allowed.
    ///
    /// Long ranges are rejected so that generating the day-by-day balance
    /// history stays bounded.
    #[error("the date range covers {days} days, the maximum is {max_days}")]
    DateRangeTooLong {
        /// The number of days in the rejected range.
        days: i64,
        /// The largest number of days allowed.
        max_days: i64,
    },

    /// A monetary amount was negative, NaN or infinite.
    #[error("{0} is not a valid amount, amounts must be finite and not negative")]
    InvalidAmount(f64),

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A string did not name a transaction type.
    #[error("\"{0}\" is not a valid transaction type, expected \"income\" or \"expense\"")]
    InvalidTransactionType(String),

    /// The requested resource was not found.
    ///
    /// Also returned when the resource exists but belongs to another user, so
    /// callers cannot probe for other users' data.
    ///
    /// Internally, this error may occur when a query returns no rows or a
    /// foreign key does not refer to a valid row.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Transactions could not be written as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// The transaction was stored but the budgets it should count against
    /// could not be updated.
    ///
    /// The transaction is not rolled back. Retrying the budget update could
    /// double count, so the failure is reported instead.
    #[error("transaction {transaction_id} was recorded but its budgets were not updated: {source}")]
    BudgetUpdateFailed {
        /// The ID of the transaction that was stored.
        transaction_id: TransactionId,
        /// The error from the budget update.
        source: Box<Error>,
    },
}

impl Error {
    /// Whether the error was caused by invalid input rather than a missing
    /// resource or a storage failure.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidDateRange { .. }
                | Error::DateRangeTooLong { .. }
                | Error::InvalidAmount(_)
                | Error::EmptyCategoryName
                | Error::InvalidTransactionType(_)
        )
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Error::NotFound
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::CsvError(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            error if error.is_validation_error() => (StatusCode::BAD_REQUEST, error.to_string()),
            Error::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Error::BudgetUpdateFailed { transaction_id, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "transaction {transaction_id} was recorded but its budgets could not be updated"
                ),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an unexpected error occurred, check the server logs for more details"
                        .to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
