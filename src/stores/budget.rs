//! Defines the budget store trait.

use time::Date;

use crate::{
    Error,
    budget::{Budget, NewBudget},
    database_id::{BudgetId, CategoryId, UserId},
};

/// Creates, retrieves and updates budgets.
pub trait BudgetStore {
    /// Create a new budget for `user_id` with nothing spent.
    fn create(&self, user_id: UserId, budget: NewBudget) -> Result<Budget, Error>;

    /// Get a budget by its ID.
    ///
    /// Implementers must return [Error::NotFound] if the budget does not exist
    /// or belongs to another user.
    fn get(&self, user_id: UserId, budget_id: BudgetId) -> Result<Budget, Error>;

    /// Get all budgets owned by `user_id`.
    fn get_by_user(&self, user_id: UserId) -> Result<Vec<Budget>, Error>;

    /// Get the budgets for `category_id` whose window contains `date`, with both
    /// window boundaries counting as inside.
    fn get_active(
        &self,
        user_id: UserId,
        category_id: CategoryId,
        date: Date,
    ) -> Result<Vec<Budget>, Error>;

    /// Add `delta` to the budget's `spent` and return the updated budget.
    ///
    /// Implementers must apply the increment atomically with respect to other
    /// writers of the same budget, i.e. no read-modify-write in application code.
    fn increment_spent(&self, budget_id: BudgetId, delta: f64) -> Result<Budget, Error>;

    /// Add `delta` to the `spent` of every budget in `budget_ids`.
    ///
    /// The default implementation increments one budget at a time and stops at
    /// the first error, leaving the budgets before it updated.
    fn increment_spent_many(
        &self,
        budget_ids: &[BudgetId],
        delta: f64,
    ) -> Result<Vec<Budget>, Error> {
        budget_ids
            .iter()
            .map(|&budget_id| self.increment_spent(budget_id, delta))
            .collect()
    }

    /// Add `delta` to every budget of `user_id` for `category_id` whose window
    /// contains `date`, and return the updated budgets ordered by ID.
    ///
    /// The default implementation looks the budgets up with
    /// [BudgetStore::get_active] and then calls
    /// [BudgetStore::increment_spent_many], so a budget deleted in between
    /// fails the whole call. Implementers should override this to match and
    /// update the budgets in one atomic step.
    fn increment_active(
        &self,
        user_id: UserId,
        category_id: CategoryId,
        date: Date,
        delta: f64,
    ) -> Result<Vec<Budget>, Error> {
        let budget_ids: Vec<BudgetId> = self
            .get_active(user_id, category_id, date)?
            .into_iter()
            .filter(|budget| budget.covers(date))
            .map(|budget| budget.id)
            .collect();

        self.increment_spent_many(&budget_ids, delta)
    }

    /// Delete a budget owned by `user_id`.
    ///
    /// Implementers must return [Error::NotFound] if the budget does not exist
    /// or belongs to another user.
    fn delete(&self, user_id: UserId, budget_id: BudgetId) -> Result<(), Error>;
}
