//! Implements a SQLite backed budget store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    budget::{Budget, NewBudget},
    database_id::{BudgetId, CategoryId, UserId},
    db::{CreateTable, MapRow},
    stores::BudgetStore,
};

use super::lock;

/// Creates, retrieves and updates budgets in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteBudgetStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteBudgetStore {
    /// Create a new budget store with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl BudgetStore for SQLiteBudgetStore {
    /// Create a budget in the database with nothing spent.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `category_id` does not refer to a valid category,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&self, user_id: UserId, budget: NewBudget) -> Result<Budget, Error> {
        lock(&self.connection)?
            .prepare(
                "INSERT INTO budget (user_id, category_id, amount, spent, start_date, end_date)
                 VALUES (?1, ?2, ?3, 0, ?4, ?5)
                 RETURNING id, user_id, category_id, amount, spent, start_date, end_date",
            )?
            .query_row(
                (
                    user_id,
                    budget.category_id,
                    budget.amount,
                    budget.start_date,
                    budget.end_date,
                ),
                Self::map_row,
            )
            .map_err(|error| error.into())
    }

    fn get(&self, user_id: UserId, budget_id: BudgetId) -> Result<Budget, Error> {
        lock(&self.connection)?
            .prepare(
                "SELECT id, user_id, category_id, amount, spent, start_date, end_date
                 FROM budget WHERE id = :id AND user_id = :user_id",
            )?
            .query_row(
                rusqlite::named_params! {":id": budget_id, ":user_id": user_id},
                Self::map_row,
            )
            .map_err(|error| error.into())
    }

    fn get_by_user(&self, user_id: UserId) -> Result<Vec<Budget>, Error> {
        lock(&self.connection)?
            .prepare(
                "SELECT id, user_id, category_id, amount, spent, start_date, end_date
                 FROM budget WHERE user_id = :user_id ORDER BY id",
            )?
            .query_map(&[(":user_id", &user_id)], Self::map_row)?
            .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
            .collect()
    }

    /// Retrieve the budgets for the category whose window contains `date`.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn get_active(
        &self,
        user_id: UserId,
        category_id: CategoryId,
        date: Date,
    ) -> Result<Vec<Budget>, Error> {
        lock(&self.connection)?
            .prepare(
                "SELECT id, user_id, category_id, amount, spent, start_date, end_date
                 FROM budget
                 WHERE user_id = :user_id
                   AND category_id = :category_id
                   AND start_date <= :date
                   AND end_date >= :date
                 ORDER BY id",
            )?
            .query_map(
                rusqlite::named_params! {
                    ":user_id": user_id,
                    ":category_id": category_id,
                    ":date": date,
                },
                Self::map_row,
            )?
            .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
            .collect()
    }

    /// Add `delta` to the budget's `spent` with a single `UPDATE` statement.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `budget_id` does not refer to a budget,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn increment_spent(&self, budget_id: BudgetId, delta: f64) -> Result<Budget, Error> {
        lock(&self.connection)?
            .prepare(
                "UPDATE budget SET spent = spent + ?1 WHERE id = ?2
                 RETURNING id, user_id, category_id, amount, spent, start_date, end_date",
            )?
            .query_row((delta, budget_id), Self::map_row)
            .map_err(|error| error.into())
    }

    /// Match and update the active budgets with a single `UPDATE` statement,
    /// so a budget deleted by another writer is simply skipped.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn increment_active(
        &self,
        user_id: UserId,
        category_id: CategoryId,
        date: Date,
        delta: f64,
    ) -> Result<Vec<Budget>, Error> {
        let mut budgets = lock(&self.connection)?
            .prepare(
                "UPDATE budget SET spent = spent + :delta
                 WHERE user_id = :user_id
                   AND category_id = :category_id
                   AND start_date <= :date
                   AND end_date >= :date
                 RETURNING id, user_id, category_id, amount, spent, start_date, end_date",
            )?
            .query_map(
                rusqlite::named_params! {
                    ":delta": delta,
                    ":user_id": user_id,
                    ":category_id": category_id,
                    ":date": date,
                },
                Self::map_row,
            )?
            .collect::<Result<Vec<Budget>, rusqlite::Error>>()?;

        // RETURNING gives no ordering guarantee.
        budgets.sort_by_key(|budget| budget.id);

        Ok(budgets)
    }

    fn delete(&self, user_id: UserId, budget_id: BudgetId) -> Result<(), Error> {
        let rows_affected = lock(&self.connection)?.execute(
            "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
            (budget_id, user_id),
        )?;

        match rows_affected {
            0 => Err(Error::NotFound),
            _ => Ok(()),
        }
    }
}

impl CreateTable for SQLiteBudgetStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS budget (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                spent REAL NOT NULL DEFAULT 0,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                CHECK (start_date <= end_date),
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
            )",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_budget_user_category ON budget(user_id, category_id);",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteBudgetStore {
    type ReturnType = Budget;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Budget {
            id: row.get(offset)?,
            user_id: row.get(offset + 1)?,
            category_id: row.get(offset + 2)?,
            amount: row.get(offset + 3)?,
            spent: row.get(offset + 4)?,
            start_date: row.get(offset + 5)?,
            end_date: row.get(offset + 6)?,
        })
    }
}
