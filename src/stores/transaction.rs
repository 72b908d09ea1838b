//! Defines the transaction store trait.

use std::ops::RangeInclusive;

use time::Date;

use crate::{
    Error,
    database_id::UserId,
    transaction::{Transaction, TransactionBuilder},
};

/// Handles the creation and retrieval of transactions.
pub trait TransactionStore {
    /// Store a new transaction for `user_id`.
    ///
    /// The builder is expected to be validated already.
    fn create(&self, user_id: UserId, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Get all of a user's transactions, newest first.
    fn get_by_user(&self, user_id: UserId) -> Result<Vec<Transaction>, Error>;

    /// Get a user's transactions whose calendar date is within `date_range`
    /// (inclusive), oldest first.
    fn get_in_range(
        &self,
        user_id: UserId,
        date_range: RangeInclusive<Date>,
    ) -> Result<Vec<Transaction>, Error>;
}
