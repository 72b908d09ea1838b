//! Database ID type definitions.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a [Category](crate::Category).
pub type CategoryId = DatabaseId;
/// The ID of a [Budget](crate::Budget).
pub type BudgetId = DatabaseId;
/// The ID of a [Transaction](crate::Transaction).
pub type TransactionId = DatabaseId;

/// A newtype wrapper for integer user IDs.
///
/// The user ID always comes from an already authenticated caller, every
/// ledger operation takes it as an explicit argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw integer ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for UserId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for UserId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}
