//! Contains the SQLite implementations of the ledger stores and a convenience
//! function for building a [Ledger] on top of them.

mod budget;
mod category;
mod transaction;

pub use budget::SQLiteBudgetStore;
pub use category::SQLiteCategoryStore;
pub use transaction::SQLiteTransactionStore;

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{Error, config::LedgerConfig, db::initialize, ledger::Ledger};

/// An alias for a [Ledger] that uses SQLite for the backend.
pub type SQLiteLedger = Ledger<SQLiteCategoryStore, SQLiteBudgetStore, SQLiteTransactionStore>;

/// Creates a [Ledger] whose stores share the SQLite `connection`.
///
/// This function will modify the database by adding the tables for the domain
/// models to the database.
///
/// # Errors
/// Returns an error if the database cannot be initialized.
pub fn create_ledger(connection: Connection, config: LedgerConfig) -> Result<SQLiteLedger, Error> {
    initialize(&connection)?;

    let connection = Arc::new(Mutex::new(connection));

    Ok(Ledger::new(
        SQLiteCategoryStore::new(connection.clone()),
        SQLiteBudgetStore::new(connection.clone()),
        SQLiteTransactionStore::new(connection),
        config,
    ))
}

/// Lock the shared connection, mapping a poisoned lock to [Error::DatabaseLockError].
fn lock(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|_| Error::DatabaseLockError)
}
