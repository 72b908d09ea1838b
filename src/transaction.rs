//! Defines the transaction model: a single income or expense event.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{CategoryId, TransactionId, UserId},
};

/// Whether money was earned or spent.
///
/// Categories carry a type as well, so the same enum is used for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

impl TransactionType {
    /// The lowercase name used in storage and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// The effect of `amount` on a balance: positive for income, negative for expenses.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        text.parse()
            .map_err(|_| FromSqlError::Other(format!("invalid transaction type {text:?}").into()))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions are immutable once stored. To create a new `Transaction`, use
/// [Transaction::build] and hand the builder to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserId,
    /// The category the transaction belongs to, if any.
    pub category_id: Option<CategoryId>,
    /// The amount of money spent or earned. Never negative, the direction is
    /// given by `transaction_type`.
    pub amount: f64,
    /// Whether this is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: f64, transaction_type: TransactionType) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            transaction_type,
            category_id: None,
            description: String::new(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// The calendar day the transaction happened on.
    pub fn date(&self) -> Date {
        self.timestamp.date()
    }

    /// The amount with its sign applied: positive for income, negative for expenses.
    pub fn signed_amount(&self) -> f64 {
        self.transaction_type.signed(self.amount)
    }
}

/// A builder for new [Transaction]s that have not been stored yet.
///
/// The timestamp defaults to the current UTC time, the category to none and
/// the description to an empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    /// The amount of money, must be finite and not negative.
    pub amount: f64,
    /// Whether this is income or an expense.
    pub transaction_type: TransactionType,
    /// The optional category of the transaction.
    pub category_id: Option<CategoryId>,
    /// A text description of the transaction.
    pub description: String,
    /// When the transaction happened.
    pub timestamp: OffsetDateTime,
}

impl TransactionBuilder {
    /// Set the category for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set when the transaction happened.
    pub fn timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Check that the builder describes a valid transaction.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount is negative, NaN or infinite.
    pub fn validate(&self) -> Result<(), Error> {
        validate_amount(self.amount)
    }
}

/// Check that a monetary amount is finite and not negative.
pub(crate) fn validate_amount(amount: f64) -> Result<(), Error> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidAmount(amount))
    }
}
