//! Pure aggregation functions behind the ledger statistics.
//!
//! Every function takes the window `[start, end]` (inclusive) and ignores
//! transactions dated outside it. An inverted window produces empty output.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    category::{Category, CategoryName},
    database_id::CategoryId,
    date_range::days_in_range,
    transaction::{Transaction, TransactionType},
};

/// The sum of transaction amounts in one category over a reporting window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The ID of the category.
    pub category_id: CategoryId,
    /// The name of the category.
    pub category_name: CategoryName,
    /// The sum of the amounts of the category's transactions in the window.
    pub total: f64,
    /// The type of the category.
    #[serde(rename = "type")]
    pub category_type: TransactionType,
}

/// What a [DailyTotal] sums up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalKind {
    /// Income on the day.
    Income,
    /// Expenses on the day.
    Expense,
    /// The running balance at the end of the day.
    Balance,
}

impl From<TransactionType> for TotalKind {
    fn from(transaction_type: TransactionType) -> Self {
        match transaction_type {
            TransactionType::Income => Self::Income,
            TransactionType::Expense => Self::Expense,
        }
    }
}

/// An aggregated amount for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    /// The day the total is for.
    pub date: Date,
    /// The aggregated amount.
    pub total: f64,
    /// What the total represents.
    #[serde(rename = "type")]
    pub kind: TotalKind,
}

fn in_window(transaction: &Transaction, start: Date, end: Date) -> bool {
    let date = transaction.date();
    start <= date && date <= end
}

/// Sum transaction amounts per category.
///
/// Every category in `categories` appears exactly once, with a total of zero
/// if it has no transactions in the window. Transactions without a category,
/// or with a category not in `categories`, are not counted.
/// Sorted by total, largest first, ties broken by category ID.
pub fn category_totals(
    categories: &[Category],
    transactions: &[Transaction],
    start: Date,
    end: Date,
) -> Vec<CategoryTotal> {
    let mut sums: HashMap<CategoryId, f64> = HashMap::new();

    for transaction in transactions.iter().filter(|t| in_window(t, start, end)) {
        if let Some(category_id) = transaction.category_id {
            *sums.entry(category_id).or_insert(0.0) += transaction.amount;
        }
    }

    let mut totals: Vec<CategoryTotal> = categories
        .iter()
        .map(|category| CategoryTotal {
            category_id: category.id,
            category_name: category.name.clone(),
            total: sums.get(&category.id).copied().unwrap_or(0.0),
            category_type: category.category_type,
        })
        .collect();

    totals.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then(a.category_id.cmp(&b.category_id))
    });

    totals
}

/// Sum the amounts of transactions of `transaction_type` per calendar day.
///
/// Only days with at least one matching transaction are returned, in
/// ascending date order.
pub fn daily_totals(
    transactions: &[Transaction],
    transaction_type: TransactionType,
    start: Date,
    end: Date,
) -> Vec<DailyTotal> {
    let mut sums: HashMap<Date, f64> = HashMap::new();

    for transaction in transactions
        .iter()
        .filter(|t| t.transaction_type == transaction_type && in_window(t, start, end))
    {
        *sums.entry(transaction.date()).or_insert(0.0) += transaction.amount;
    }

    let mut totals: Vec<DailyTotal> = sums
        .into_iter()
        .map(|(date, total)| DailyTotal {
            date,
            total,
            kind: transaction_type.into(),
        })
        .collect();
    totals.sort_by_key(|total| total.date);

    totals
}

/// Calculate the running balance at the end of every day in the window.
///
/// The balance starts at zero on `start`, so it is relative to the window and
/// not the user's all-time balance. Each day's income and expenses are netted
/// before being added to the running sum. Days without transactions repeat
/// the previous balance, so the result has exactly one entry per day.
pub fn balance_history(transactions: &[Transaction], start: Date, end: Date) -> Vec<DailyTotal> {
    let mut income_by_day: HashMap<Date, f64> = HashMap::new();
    let mut expenses_by_day: HashMap<Date, f64> = HashMap::new();

    for transaction in transactions.iter().filter(|t| in_window(t, start, end)) {
        let sums = match transaction.transaction_type {
            TransactionType::Income => &mut income_by_day,
            TransactionType::Expense => &mut expenses_by_day,
        };
        *sums.entry(transaction.date()).or_insert(0.0) += transaction.amount;
    }

    let mut balance = 0.0;

    days_in_range(start, end)
        .map(|date| {
            let income = income_by_day.get(&date).copied().unwrap_or(0.0);
            let expenses = expenses_by_day.get(&date).copied().unwrap_or(0.0);
            balance += income - expenses;

            DailyTotal {
                date,
                total: balance,
                kind: TotalKind::Balance,
            }
        })
        .collect()
}
