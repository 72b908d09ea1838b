//! Implements a SQLite backed category store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryName, NewCategory},
    database_id::{CategoryId, UserId},
    db::{CreateTable, MapRow},
    stores::CategoryStore,
};

use super::lock;

/// Creates and retrieves transaction categories to/from a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCategoryStore {
    /// Create a new category store with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CategoryStore for SQLiteCategoryStore {
    /// Create a category in the database.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn create(&self, user_id: UserId, category: NewCategory) -> Result<Category, Error> {
        lock(&self.connection)?
            .prepare(
                "INSERT INTO category (user_id, name, type) VALUES (?1, ?2, ?3)
                 RETURNING id, user_id, name, type",
            )?
            .query_row(
                (user_id, category.name.as_ref(), category.category_type),
                Self::map_row,
            )
            .map_err(|error| error.into())
    }

    /// Retrieve the category with `category_id` owned by `user_id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if there is no such category for the user,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, user_id: UserId, category_id: CategoryId) -> Result<Category, Error> {
        lock(&self.connection)?
            .prepare(
                "SELECT id, user_id, name, type FROM category
                 WHERE id = :id AND user_id = :user_id",
            )?
            .query_row(
                rusqlite::named_params! {":id": category_id, ":user_id": user_id},
                Self::map_row,
            )
            .map_err(|error| error.into())
    }

    /// Retrieve all of a user's categories in the order they were created.
    ///
    /// # Errors
    /// This function will return an error if there is an SQL error.
    fn get_by_user(&self, user_id: UserId) -> Result<Vec<Category>, Error> {
        lock(&self.connection)?
            .prepare("SELECT id, user_id, name, type FROM category WHERE user_id = :user_id ORDER BY id")?
            .query_map(&[(":user_id", &user_id)], Self::map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }
}

impl CreateTable for SQLiteCategoryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense'))
            );",
            (),
        )?;

        connection.execute(
            "CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteCategoryStore {
    type ReturnType = Category;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = row.get(offset + 1)?;
        let raw_name: String = row.get(offset + 2)?;
        let category_type = row.get(offset + 3)?;

        Ok(Self::ReturnType {
            id,
            user_id,
            name: CategoryName::new_unchecked(&raw_name),
            category_type,
        })
    }
}
