//! Defines the category store trait.

use crate::{
    Error,
    category::{Category, NewCategory},
    database_id::{CategoryId, UserId},
};

/// Creates and retrieves the categories owned by a user.
pub trait CategoryStore {
    /// Create a new category for `user_id`.
    fn create(&self, user_id: UserId, category: NewCategory) -> Result<Category, Error>;

    /// Get a category by its ID.
    ///
    /// Implementers must return [Error::NotFound] if the category does not
    /// exist or belongs to another user.
    fn get(&self, user_id: UserId, category_id: CategoryId) -> Result<Category, Error>;

    /// Get all categories owned by `user_id`.
    fn get_by_user(&self, user_id: UserId) -> Result<Vec<Category>, Error>;
}
