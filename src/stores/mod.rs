//! Contains the traits for the ledger store and their SQLite implementations.
//!
//! The ledger services only talk to storage through these traits, so tests can
//! swap in doubles and the SQLite backend can be replaced.

mod budget;
mod category;
mod transaction;

pub mod sqlite;

pub use budget::BudgetStore;
pub use category::CategoryStore;
pub use transaction::TransactionStore;
