//! Defines the budget model: a spending cap for one category over an inclusive date window.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{BudgetId, CategoryId, UserId},
    transaction::validate_amount,
};

/// A spending target for a category between `start_date` and `end_date`, both inclusive.
///
/// `spent` only ever grows, it is increased by the budget consumption tracker
/// each time an expense in the category is recorded inside the window.
/// Spending past `amount` is allowed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The user that owns the budget.
    pub user_id: UserId,
    /// The category whose expenses count against the budget.
    pub category_id: CategoryId,
    /// The spending cap.
    pub amount: f64,
    /// The sum of expenses recorded against the budget so far.
    pub spent: f64,
    /// The first day of the budget window.
    pub start_date: Date,
    /// The last day of the budget window.
    pub end_date: Date,
}

impl Budget {
    /// Whether `date` falls inside the budget window, boundaries included.
    pub fn covers(&self, date: Date) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// How much is left before the cap is reached. Negative when over budget.
    pub fn remaining(&self) -> f64 {
        self.amount - self.spent
    }

    /// Whether more has been spent than the budget allows.
    pub fn is_over(&self) -> bool {
        self.spent > self.amount
    }
}

/// The details needed to create a [Budget].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewBudget {
    /// The category whose expenses count against the budget.
    pub category_id: CategoryId,
    /// The spending cap.
    pub amount: f64,
    /// The first day of the budget window.
    pub start_date: Date,
    /// The last day of the budget window.
    pub end_date: Date,
}

impl NewBudget {
    /// Check that the budget has a valid amount and window.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::InvalidAmount] if the amount is negative or not finite,
    /// - or [Error::InvalidDateRange] if `end_date` is before `start_date`.
    pub fn validate(&self) -> Result<(), Error> {
        validate_amount(self.amount)?;

        if self.end_date < self.start_date {
            return Err(Error::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }

        Ok(())
    }
}
