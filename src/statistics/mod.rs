//! Computes category totals, daily totals and balance history for a user
//! over a date range.

mod aggregation;

pub use aggregation::{
    CategoryTotal, DailyTotal, TotalKind, balance_history, category_totals, daily_totals,
};

use serde::{Deserialize, Deserializer, Serialize, de};
use time::Date;

use crate::{
    Error,
    database_id::UserId,
    date_range::DateRange,
    stores::{CategoryStore, TransactionStore},
    transaction::TransactionType,
};

/// A request for statistics over `[start_date, end_date]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatisticsQuery {
    /// The first day of the window.
    pub start_date: Date,
    /// The last day of the window.
    pub end_date: Date,
    /// When set, daily totals for this transaction type are included. An
    /// empty string is the same as no type.
    #[serde(rename = "type", default, deserialize_with = "empty_as_none")]
    pub transaction_type: Option<TransactionType>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<TransactionType>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) if text.is_empty() => Ok(None),
        Some(text) => text.parse().map(Some).map_err(de::Error::custom),
    }
}

/// The combined statistics for a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    /// One total per category owned by the user, largest first.
    pub category_totals: Vec<CategoryTotal>,
    /// Per-day totals for the requested transaction type, only present when
    /// a type was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_totals: Option<Vec<DailyTotal>>,
    /// The running balance at the end of every day in the range.
    pub balance_history: Vec<DailyTotal>,
}

/// Reads categories and transactions from the stores and aggregates them.
///
/// Holds no state of its own, so calling [StatisticsAggregator::get_statistics]
/// repeatedly on unchanged data gives the same result.
#[derive(Debug, Clone)]
pub struct StatisticsAggregator<C, T> {
    category_store: C,
    transaction_store: T,
}

impl<C, T> StatisticsAggregator<C, T>
where
    C: CategoryStore,
    T: TransactionStore,
{
    /// Create an aggregator that reads from the given stores.
    pub fn new(category_store: C, transaction_store: T) -> Self {
        Self {
            category_store,
            transaction_store,
        }
    }

    /// Compute the statistics for `user_id` over `date_range`.
    ///
    /// The transactions in the range are loaded once and shared by all three
    /// aggregations.
    ///
    /// # Errors
    /// Returns the first storage error. No partial statistics are returned.
    pub fn get_statistics(
        &self,
        user_id: UserId,
        date_range: &DateRange,
        transaction_type: Option<TransactionType>,
    ) -> Result<Statistics, Error> {
        let (start, end) = (date_range.start(), date_range.end());

        let categories = self.category_store.get_by_user(user_id)?;
        let transactions = self
            .transaction_store
            .get_in_range(user_id, (*date_range).into())?;

        tracing::debug!(
            "aggregating {} transactions over {} categories for user {user_id} from {start} to {end}",
            transactions.len(),
            categories.len(),
        );

        Ok(Statistics {
            category_totals: category_totals(&categories, &transactions, start, end),
            daily_totals: transaction_type
                .map(|transaction_type| daily_totals(&transactions, transaction_type, start, end)),
            balance_history: balance_history(&transactions, start, end),
        })
    }
}
