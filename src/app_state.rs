//! Implements a struct that holds the state of the REST server.

use rusqlite::Connection;

use crate::{
    Error,
    config::LedgerConfig,
    stores::sqlite::{SQLiteLedger, create_ledger},
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The ledger that handles every request.
    pub ledger: SQLiteLedger,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, config: LedgerConfig) -> Result<Self, Error> {
        Ok(Self {
            ledger: create_ledger(db_connection, config)?,
        })
    }
}
