/*! This module defines the traits for mapping domain types to the application's SQLite database and sets up its schema. */

use rusqlite::{Connection, Error, Row, Transaction as SqlTransaction, TransactionBehavior};

use crate::stores::sqlite::{SQLiteBudgetStore, SQLiteCategoryStore, SQLiteTransactionStore};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
pub trait MapRow {
    /// The type a row is converted into.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// **Note:** This function expects that the row object contains all the table columns in the order they were defined.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if an invalid column index was used.
    fn map_row(row: &Row) -> Result<Self::ReturnType, Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, reading columns starting at `offset`.
    ///
    /// # Errors
    /// Returns an error if a row item cannot be converted into the corresponding rust type, or if an invalid column index was used.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, Error>;
}

/// Create the tables for the ledger models and enable foreign key checks.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    SQLiteCategoryStore::create_table(&transaction)?;
    SQLiteTransactionStore::create_table(&transaction)?;
    SQLiteBudgetStore::create_table(&transaction)?;

    transaction.commit()
}

#[cfg(test)]
mod db_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("first initialization failed");
        initialize(&connection).expect("second initialization failed");
    }

    #[test]
    fn initialize_creates_ledger_tables() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let mut tables: Vec<String> = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|name| name.unwrap())
            .collect();
        tables.retain(|name| !name.starts_with("sqlite_"));

        assert_eq!(tables, vec!["budget", "category", "transaction"]);
    }
}
