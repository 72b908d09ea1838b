//! Implements a SQLite backed transaction store.

use std::{
    ops::RangeInclusive,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    database_id::UserId,
    db::{CreateTable, MapRow},
    stores::TransactionStore,
    transaction::{Transaction, TransactionBuilder},
};

use super::lock;

/// Stores transactions in a SQLite database.
///
/// Note that because a transaction may reference a category, the category
/// table must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new transaction in the database.
    ///
    /// The calendar date of the timestamp is stored alongside it so range
    /// queries can use the index on `(user_id, date)`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `category_id` does not refer to a valid category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&self, user_id: UserId, builder: TransactionBuilder) -> Result<Transaction, Error> {
        let transaction = lock(&self.connection)?
            .prepare(
                "INSERT INTO \"transaction\" (user_id, category_id, amount, type, description, timestamp, date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 RETURNING id, user_id, category_id, amount, type, description, timestamp",
            )?
            .query_row(
                (
                    user_id,
                    builder.category_id,
                    builder.amount,
                    builder.transaction_type,
                    builder.description,
                    builder.timestamp,
                    builder.timestamp.date(),
                ),
                Self::map_row,
            )?;

        Ok(transaction)
    }

    /// Retrieve all of a user's transactions, newest first.
    ///
    /// Timestamps are compared as instants, so transactions recorded with
    /// different UTC offsets are still ordered by when they happened.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is a SQL error.
    fn get_by_user(&self, user_id: UserId) -> Result<Vec<Transaction>, Error> {
        lock(&self.connection)?
            .prepare(
                "SELECT id, user_id, category_id, amount, type, description, timestamp
                 FROM \"transaction\"
                 WHERE user_id = :user_id
                 ORDER BY julianday(timestamp) DESC, id DESC",
            )?
            .query_map(&[(":user_id", &user_id)], Self::map_row)?
            .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
            .collect()
    }

    /// Retrieve a user's transactions dated within `date_range`, oldest first.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is a SQL error.
    fn get_in_range(
        &self,
        user_id: UserId,
        date_range: RangeInclusive<Date>,
    ) -> Result<Vec<Transaction>, Error> {
        lock(&self.connection)?
            .prepare(
                "SELECT id, user_id, category_id, amount, type, description, timestamp
                 FROM \"transaction\"
                 WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
                 ORDER BY julianday(timestamp) ASC, id ASC",
            )?
            .query_map(
                (user_id, date_range.start(), date_range.end()),
                Self::map_row,
            )?
            .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
            .collect()
    }
}

impl CreateTable for SQLiteTransactionStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category_id INTEGER,
                amount REAL NOT NULL CHECK (amount >= 0),
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                description TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                date TEXT NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
            )",
            (),
        )?;

        // Used by the statistics range queries.
        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteTransactionStore {
    type ReturnType = Transaction;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Transaction {
            id: row.get(offset)?,
            user_id: row.get(offset + 1)?,
            category_id: row.get(offset + 2)?,
            amount: row.get(offset + 3)?,
            transaction_type: row.get(offset + 4)?,
            description: row.get(offset + 5)?,
            timestamp: row.get(offset + 6)?,
        })
    }
}
