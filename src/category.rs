//! This file defines the `Category` type and the types needed to create a category.
//!
//! A category is a grouping key for transactions and the target of budgets.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    database_id::{CategoryId, UserId},
    transaction::TransactionType,
};

/// The name of a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an error if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.trim().is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CategoryName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CategoryName> for String {
    fn from(name: CategoryName) -> Self {
        name.0
    }
}

/// A category for expenses or income, e.g., 'Groceries', 'Eating Out', 'Wages'.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The user that owns the category.
    pub user_id: UserId,
    /// The display name of the category.
    pub name: CategoryName,
    /// Whether the category groups income or expenses.
    #[serde(rename = "type")]
    pub category_type: TransactionType,
}

/// The details needed to create a [Category].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewCategory {
    /// The display name of the category.
    pub name: CategoryName,
    /// Whether the category groups income or expenses.
    #[serde(rename = "type")]
    pub category_type: TransactionType,
}
