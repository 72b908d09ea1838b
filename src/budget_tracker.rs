//! Keeps each budget's `spent` up to date as expenses are recorded.

use serde::Serialize;

use crate::{
    Error,
    budget::Budget,
    database_id::BudgetId,
    stores::BudgetStore,
    transaction::{Transaction, TransactionType},
};

/// Adds new expenses to the budgets they fall under.
///
/// Consumption is purely incremental: `spent` is never recomputed from the
/// transaction history and is never decreased.
#[derive(Debug, Clone)]
pub struct BudgetConsumptionTracker<B> {
    budget_store: B,
}

impl<B> BudgetConsumptionTracker<B>
where
    B: BudgetStore,
{
    /// Create a tracker that updates budgets in `budget_store`.
    pub fn new(budget_store: B) -> Self {
        Self { budget_store }
    }

    /// Add the amount of `transaction` to every budget it counts against.
    ///
    /// Income and transactions without a category do not count against any
    /// budget and leave the store untouched. Otherwise every budget of the
    /// owner for the transaction's category whose window contains the
    /// transaction's date is incremented, overlapping budgets included.
    ///
    /// Returns the updated budgets.
    ///
    /// # Errors
    /// Returns the store error if updating the budgets fails. Whether budgets
    /// updated before the failure stay updated depends on the store's
    /// [BudgetStore::increment_active].
    pub fn consume(&self, transaction: &Transaction) -> Result<Vec<Budget>, Error> {
        if transaction.transaction_type != TransactionType::Expense {
            return Ok(Vec::new());
        }

        let Some(category_id) = transaction.category_id else {
            return Ok(Vec::new());
        };

        let updated = self.budget_store.increment_active(
            transaction.user_id,
            category_id,
            transaction.date(),
            transaction.amount,
        )?;

        if !updated.is_empty() {
            let budget_ids: Vec<BudgetId> = updated.iter().map(|budget| budget.id).collect();
            tracing::debug!(
                "added {} from transaction {} to budgets {budget_ids:?}",
                transaction.amount,
                transaction.id
            );
        }

        for budget in updated.iter().filter(|budget| budget.is_over()) {
            tracing::info!(
                "budget {} is over its cap of {} by {}",
                budget.id,
                budget.amount,
                -budget.remaining()
            );
        }

        Ok(updated)
    }
}

/// A budget whose recorded `spent` differs from the sum of the expenses in
/// its category and window.
///
/// This is not an error: the budget is still usable, but its `spent` has
/// drifted, e.g. because the budget was created after some of its expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyWarning {
    /// The budget that has drifted.
    pub budget_id: BudgetId,
    /// The `spent` value stored on the budget.
    pub recorded_spent: f64,
    /// The sum of the expenses that fall under the budget.
    pub expected_spent: f64,
}

/// Tolerance for comparing sums of floating point amounts.
const SPENT_EPSILON: f64 = 1e-6;

/// Compare `budget.spent` against the expenses in `transactions` that fall
/// under the budget.
///
/// `transactions` may contain anything, only the owner's expenses in the
/// budget's category and window are summed. Never modifies the budget.
pub fn audit_budget(budget: &Budget, transactions: &[Transaction]) -> Option<ConsistencyWarning> {
    let expected_spent: f64 = transactions
        .iter()
        .filter(|transaction| {
            transaction.user_id == budget.user_id
                && transaction.transaction_type == TransactionType::Expense
                && transaction.category_id == Some(budget.category_id)
                && budget.covers(transaction.date())
        })
        .map(|transaction| transaction.amount)
        .sum();

    if (expected_spent - budget.spent).abs() <= SPENT_EPSILON {
        return None;
    }

    tracing::warn!(
        "budget {} has spent {} but its expenses sum to {expected_spent}",
        budget.id,
        budget.spent
    );

    Some(ConsistencyWarning {
        budget_id: budget.id,
        recorded_spent: budget.spent,
        expected_spent,
    })
}
