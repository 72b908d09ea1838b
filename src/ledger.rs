//! The entry point to the ledger: records transactions, manages categories
//! and budgets, and answers statistics queries for an authenticated user.

use crate::{
    Error,
    budget::{Budget, NewBudget},
    budget_tracker::{BudgetConsumptionTracker, ConsistencyWarning, audit_budget},
    category::{Category, NewCategory},
    config::LedgerConfig,
    database_id::{BudgetId, CategoryId, UserId},
    date_range::DateRange,
    export::transactions_to_csv,
    statistics::{Statistics, StatisticsAggregator, StatisticsQuery},
    stores::{BudgetStore, CategoryStore, TransactionStore},
    transaction::{Transaction, TransactionBuilder},
};

/// Sequences storage, budget consumption and aggregation for each request.
///
/// Every method takes the ID of the already authenticated user. Resources
/// owned by other users are reported as [Error::NotFound].
#[derive(Debug, Clone)]
pub struct Ledger<C, B, T> {
    category_store: C,
    budget_store: B,
    transaction_store: T,
    tracker: BudgetConsumptionTracker<B>,
    aggregator: StatisticsAggregator<C, T>,
    config: LedgerConfig,
}

impl<C, B, T> Ledger<C, B, T>
where
    C: CategoryStore + Clone,
    B: BudgetStore + Clone,
    T: TransactionStore + Clone,
{
    /// Create a ledger over the given stores.
    pub fn new(category_store: C, budget_store: B, transaction_store: T, config: LedgerConfig) -> Self {
        Self {
            tracker: BudgetConsumptionTracker::new(budget_store.clone()),
            aggregator: StatisticsAggregator::new(category_store.clone(), transaction_store.clone()),
            category_store,
            budget_store,
            transaction_store,
            config,
        }
    }

    /// Store a new transaction and add it to the budgets it falls under.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::InvalidAmount] if the amount is negative or not finite,
    /// - [Error::NotFound] if the category does not belong to `user_id`,
    /// - [Error::BudgetUpdateFailed] if the transaction was stored but the
    ///   budgets could not be updated,
    /// - or any other store error.
    pub fn record_transaction(
        &self,
        user_id: UserId,
        builder: TransactionBuilder,
    ) -> Result<Transaction, Error> {
        builder.validate()?;

        if let Some(category_id) = builder.category_id {
            self.category_store.get(user_id, category_id)?;
        }

        let transaction = self.transaction_store.create(user_id, builder)?;

        match self.tracker.consume(&transaction) {
            Ok(_) => Ok(transaction),
            Err(error) => {
                tracing::error!(
                    "transaction {} was stored but updating its budgets failed: {error}",
                    transaction.id
                );

                Err(Error::BudgetUpdateFailed {
                    transaction_id: transaction.id,
                    source: Box::new(error),
                })
            }
        }
    }

    /// Compute the statistics described by `query` for `user_id`.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::InvalidDateRange] if the end date is before the start date,
    /// - [Error::DateRangeTooLong] if the range exceeds the configured maximum,
    /// - or the first store error. Storage is not touched when the range is
    ///   invalid.
    pub fn get_statistics(
        &self,
        user_id: UserId,
        query: &StatisticsQuery,
    ) -> Result<Statistics, Error> {
        let date_range = self.date_range(query.start_date, query.end_date)?;

        tracing::debug!(
            "statistics requested by user {user_id} for {} days",
            date_range.num_days()
        );

        self.aggregator
            .get_statistics(user_id, &date_range, query.transaction_type)
    }

    /// Create a category for `user_id`.
    ///
    /// # Errors
    /// Returns an error if the category cannot be stored.
    pub fn create_category(
        &self,
        user_id: UserId,
        category: NewCategory,
    ) -> Result<Category, Error> {
        self.category_store.create(user_id, category)
    }

    /// Get one of the user's categories.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the category does not belong to `user_id`.
    pub fn get_category(&self, user_id: UserId, category_id: CategoryId) -> Result<Category, Error> {
        self.category_store.get(user_id, category_id)
    }

    /// List the user's categories.
    ///
    /// # Errors
    /// Returns an error if the categories cannot be read.
    pub fn list_categories(&self, user_id: UserId) -> Result<Vec<Category>, Error> {
        self.category_store.get_by_user(user_id)
    }

    /// Create a budget with nothing spent.
    ///
    /// Expenses recorded before the budget existed are not counted.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::InvalidAmount] or [Error::InvalidDateRange] if the budget is invalid,
    /// - [Error::NotFound] if the category does not belong to `user_id`,
    /// - or a store error.
    pub fn create_budget(&self, user_id: UserId, budget: NewBudget) -> Result<Budget, Error> {
        budget.validate()?;
        self.category_store.get(user_id, budget.category_id)?;

        self.budget_store.create(user_id, budget)
    }

    /// List the user's budgets.
    ///
    /// # Errors
    /// Returns an error if the budgets cannot be read.
    pub fn list_budgets(&self, user_id: UserId) -> Result<Vec<Budget>, Error> {
        self.budget_store.get_by_user(user_id)
    }

    /// Delete one of the user's budgets.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the budget does not belong to `user_id`.
    pub fn delete_budget(&self, user_id: UserId, budget_id: BudgetId) -> Result<(), Error> {
        self.budget_store.delete(user_id, budget_id)
    }

    /// List all of the user's transactions, newest first.
    ///
    /// # Errors
    /// Returns an error if the transactions cannot be read.
    pub fn list_transactions(&self, user_id: UserId) -> Result<Vec<Transaction>, Error> {
        self.transaction_store.get_by_user(user_id)
    }

    /// List the user's transactions dated between `start` and `end` inclusive,
    /// oldest first.
    ///
    /// # Errors
    /// Returns a validation error for an inverted or too long range, or a
    /// store error.
    pub fn transactions_in_range(
        &self,
        user_id: UserId,
        start: time::Date,
        end: time::Date,
    ) -> Result<Vec<Transaction>, Error> {
        let date_range = self.date_range(start, end)?;

        self.transaction_store
            .get_in_range(user_id, date_range.into())
    }

    /// Export the user's transactions dated between `start` and `end`
    /// inclusive as CSV, oldest first, with category names resolved.
    ///
    /// # Errors
    /// Returns a validation error for an inverted or too long range, a store
    /// error, or [Error::CsvError] if the CSV cannot be written.
    pub fn export_transactions(
        &self,
        user_id: UserId,
        start: time::Date,
        end: time::Date,
    ) -> Result<Vec<u8>, Error> {
        let transactions = self.transactions_in_range(user_id, start, end)?;
        let categories = self.list_categories(user_id)?;

        tracing::debug!(
            "exporting {} transactions for user {user_id} from {start} to {end}",
            transactions.len()
        );

        transactions_to_csv(&transactions, &categories)
    }

    /// Check whether the budget's `spent` still matches the expenses in its
    /// category and window.
    ///
    /// Read only: a drifted budget is reported, never corrected.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if the budget does not belong to `user_id`,
    /// or a store error.
    pub fn check_budget(
        &self,
        user_id: UserId,
        budget_id: BudgetId,
    ) -> Result<Option<ConsistencyWarning>, Error> {
        let budget = self.budget_store.get(user_id, budget_id)?;
        let transactions = self
            .transaction_store
            .get_in_range(user_id, budget.start_date..=budget.end_date)?;

        Ok(audit_budget(&budget, &transactions))
    }

    fn date_range(&self, start: time::Date, end: time::Date) -> Result<DateRange, Error> {
        DateRange::new(start, end, self.config.max_range_days)
    }
}

#[cfg(test)]
mod ledger_tests {
    use rusqlite::Connection;
    use time::{
        Date,
        macros::{date, datetime},
    };

    use crate::{
        Error,
        budget::{Budget, NewBudget},
        category::{Category, CategoryName, NewCategory},
        config::LedgerConfig,
        database_id::{BudgetId, CategoryId, UserId},
        db::initialize,
        statistics::StatisticsQuery,
        stores::{
            BudgetStore,
            sqlite::{SQLiteCategoryStore, SQLiteLedger, SQLiteTransactionStore, create_ledger},
        },
        transaction::{Transaction, TransactionType},
    };

    use super::Ledger;

    fn get_test_ledger() -> SQLiteLedger {
        let connection = Connection::open_in_memory().unwrap();
        create_ledger(connection, LedgerConfig::default()).unwrap()
    }

    fn create_food_category(ledger: &SQLiteLedger, user_id: UserId) -> Category {
        ledger
            .create_category(
                user_id,
                NewCategory {
                    name: CategoryName::new_unchecked("Food"),
                    category_type: TransactionType::Expense,
                },
            )
            .unwrap()
    }

    fn food_budget(category_id: CategoryId) -> NewBudget {
        NewBudget {
            category_id,
            amount: 100.0,
            start_date: date!(2025 - 01 - 01),
            end_date: date!(2025 - 01 - 10),
        }
    }

    fn query(start_date: Date, end_date: Date) -> StatisticsQuery {
        StatisticsQuery {
            start_date,
            end_date,
            transaction_type: None,
        }
    }

    #[test]
    fn recording_expenses_consumes_budget() {
        let ledger = get_test_ledger();
        let user_id = UserId::new(1);
        let food = create_food_category(&ledger, user_id);
        let budget = ledger.create_budget(user_id, food_budget(food.id)).unwrap();

        ledger
            .record_transaction(
                user_id,
                Transaction::build(30.0, TransactionType::Expense)
                    .category_id(Some(food.id))
                    .timestamp(datetime!(2025-01-05 12:00 UTC)),
            )
            .unwrap();
        ledger
            .record_transaction(
                user_id,
                Transaction::build(90.0, TransactionType::Expense)
                    .category_id(Some(food.id))
                    .timestamp(datetime!(2025-01-10 23:00 UTC)),
            )
            .unwrap();

        let budgets = ledger.list_budgets(user_id).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].id, budget.id);
        assert_eq!(budgets[0].spent, 120.0);
        assert_eq!(ledger.check_budget(user_id, budget.id), Ok(None));
    }

    #[test]
    fn record_transaction_rejects_invalid_amount_before_storage() {
        let ledger = get_test_ledger();
        let user_id = UserId::new(1);

        let result = ledger.record_transaction(user_id, Transaction::build(-3.0, TransactionType::Expense));

        assert_eq!(result, Err(Error::InvalidAmount(-3.0)));
        assert!(ledger.list_transactions(user_id).unwrap().is_empty());
    }

    #[test]
    fn record_transaction_rejects_other_users_category() {
        let ledger = get_test_ledger();
        let food = create_food_category(&ledger, UserId::new(1));
        let intruder = UserId::new(2);

        let result = ledger.record_transaction(
            intruder,
            Transaction::build(3.0, TransactionType::Expense).category_id(Some(food.id)),
        );

        assert_eq!(result, Err(Error::NotFound));
        assert!(ledger.list_transactions(intruder).unwrap().is_empty());
    }

    #[test]
    fn create_budget_rejects_other_users_category() {
        let ledger = get_test_ledger();
        let food = create_food_category(&ledger, UserId::new(1));

        let result = ledger.create_budget(UserId::new(2), food_budget(food.id));

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn statistics_reject_inverted_range() {
        let ledger = get_test_ledger();

        let result = ledger.get_statistics(
            UserId::new(1),
            &query(date!(2025 - 01 - 10), date!(2025 - 01 - 01)),
        );

        assert_eq!(
            result,
            Err(Error::InvalidDateRange {
                start: date!(2025 - 01 - 10),
                end: date!(2025 - 01 - 01),
            })
        );
    }

    #[test]
    fn statistics_reject_ranges_longer_than_config() {
        let connection = Connection::open_in_memory().unwrap();
        let ledger = create_ledger(connection, LedgerConfig { max_range_days: 31 }).unwrap();

        let result = ledger.get_statistics(
            UserId::new(1),
            &query(date!(2025 - 01 - 01), date!(2025 - 02 - 01)),
        );

        assert_eq!(
            result,
            Err(Error::DateRangeTooLong {
                days: 32,
                max_days: 31,
            })
        );
    }

    #[test]
    fn statistics_only_see_own_transactions() {
        let ledger = get_test_ledger();
        let user_id = UserId::new(1);
        ledger
            .record_transaction(
                user_id,
                Transaction::build(50.0, TransactionType::Income)
                    .timestamp(datetime!(2025-01-01 08:00 UTC)),
            )
            .unwrap();
        ledger
            .record_transaction(
                UserId::new(2),
                Transaction::build(1000.0, TransactionType::Income)
                    .timestamp(datetime!(2025-01-02 08:00 UTC)),
            )
            .unwrap();
        ledger
            .record_transaction(
                user_id,
                Transaction::build(20.0, TransactionType::Expense)
                    .timestamp(datetime!(2025-01-03 08:00 UTC)),
            )
            .unwrap();

        let statistics = ledger
            .get_statistics(user_id, &query(date!(2025 - 01 - 01), date!(2025 - 01 - 03)))
            .unwrap();

        let balances: Vec<_> = statistics
            .balance_history
            .iter()
            .map(|day| (day.date, day.total))
            .collect();
        assert_eq!(
            balances,
            vec![
                (date!(2025 - 01 - 01), 50.0),
                (date!(2025 - 01 - 02), 50.0),
                (date!(2025 - 01 - 03), 30.0),
            ]
        );
    }

    #[test]
    fn check_budget_reports_expenses_recorded_before_budget() {
        let ledger = get_test_ledger();
        let user_id = UserId::new(1);
        let food = create_food_category(&ledger, user_id);
        ledger
            .record_transaction(
                user_id,
                Transaction::build(12.5, TransactionType::Expense)
                    .category_id(Some(food.id))
                    .timestamp(datetime!(2025-01-02 12:00 UTC)),
            )
            .unwrap();
        let budget = ledger.create_budget(user_id, food_budget(food.id)).unwrap();

        let warning = ledger.check_budget(user_id, budget.id).unwrap().unwrap();

        assert_eq!(warning.budget_id, budget.id);
        assert_eq!(warning.recorded_spent, 0.0);
        assert_eq!(warning.expected_spent, 12.5);
        // The audit never repairs the budget.
        assert_eq!(ledger.list_budgets(user_id).unwrap()[0].spent, 0.0);
    }

    #[test]
    fn delete_budget_of_other_user_is_not_found() {
        let ledger = get_test_ledger();
        let user_id = UserId::new(1);
        let food = create_food_category(&ledger, user_id);
        let budget = ledger.create_budget(user_id, food_budget(food.id)).unwrap();

        assert_eq!(
            ledger.delete_budget(UserId::new(2), budget.id),
            Err(Error::NotFound)
        );
        assert_eq!(ledger.delete_budget(user_id, budget.id), Ok(()));
        assert!(ledger.list_budgets(user_id).unwrap().is_empty());
    }

    #[test]
    fn transactions_in_range_validates_range() {
        let ledger = get_test_ledger();

        let result =
            ledger.transactions_in_range(UserId::new(1), date!(2025 - 02 - 01), date!(2025 - 01 - 01));

        assert!(matches!(result, Err(Error::InvalidDateRange { .. })));
    }

    #[test]
    fn export_resolves_category_names_in_range() {
        let ledger = get_test_ledger();
        let user_id = UserId::new(1);
        let food = create_food_category(&ledger, user_id);
        for (category_id, timestamp) in [
            (Some(food.id), datetime!(2025-01-02 12:00 UTC)),
            (None, datetime!(2025-01-03 12:00 UTC)),
            (Some(food.id), datetime!(2025-02-01 12:00 UTC)),
        ] {
            ledger
                .record_transaction(
                    user_id,
                    Transaction::build(5.0, TransactionType::Expense)
                        .category_id(category_id)
                        .timestamp(timestamp),
                )
                .unwrap();
        }

        let csv = ledger
            .export_transactions(user_id, date!(2025 - 01 - 01), date!(2025 - 01 - 31))
            .unwrap();

        assert_eq!(
            String::from_utf8(csv).unwrap(),
            "date,type,category,amount,description\n\
             2025-01-02 12:00,expense,Food,5.00,\n\
             2025-01-03 12:00,expense,Uncategorized,5.00,\n"
        );
    }

    #[test]
    fn export_validates_range() {
        let ledger = get_test_ledger();

        let result =
            ledger.export_transactions(UserId::new(1), date!(2025 - 02 - 01), date!(2025 - 01 - 01));

        assert!(matches!(result, Err(Error::InvalidDateRange { .. })));
    }

    /// Finds one active budget for any category but cannot update it.
    #[derive(Clone)]
    struct FailingBudgetStore;

    impl BudgetStore for FailingBudgetStore {
        fn create(&self, _: UserId, _: NewBudget) -> Result<Budget, Error> {
            Err(Error::DatabaseLockError)
        }

        fn get(&self, _: UserId, _: BudgetId) -> Result<Budget, Error> {
            Err(Error::NotFound)
        }

        fn get_by_user(&self, _: UserId) -> Result<Vec<Budget>, Error> {
            Ok(Vec::new())
        }

        fn get_active(
            &self,
            user_id: UserId,
            category_id: CategoryId,
            date: Date,
        ) -> Result<Vec<Budget>, Error> {
            Ok(vec![Budget {
                id: 1,
                user_id,
                category_id,
                amount: 10.0,
                spent: 0.0,
                start_date: date,
                end_date: date,
            }])
        }

        fn increment_spent(&self, _: BudgetId, _: f64) -> Result<Budget, Error> {
            Err(Error::DatabaseLockError)
        }

        fn delete(&self, _: UserId, _: BudgetId) -> Result<(), Error> {
            Err(Error::NotFound)
        }
    }

    #[test]
    fn failed_budget_update_keeps_transaction() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = std::sync::Arc::new(std::sync::Mutex::new(connection));
        let ledger = Ledger::new(
            SQLiteCategoryStore::new(connection.clone()),
            FailingBudgetStore,
            SQLiteTransactionStore::new(connection.clone()),
            LedgerConfig::default(),
        );
        let user_id = UserId::new(1);
        let food = ledger
            .create_category(
                user_id,
                NewCategory {
                    name: CategoryName::new_unchecked("Food"),
                    category_type: TransactionType::Expense,
                },
            )
            .unwrap();

        let result = ledger.record_transaction(
            user_id,
            Transaction::build(4.0, TransactionType::Expense).category_id(Some(food.id)),
        );

        let stored = ledger.list_transactions(user_id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(
            result,
            Err(Error::BudgetUpdateFailed {
                transaction_id: stored[0].id,
                source: Box::new(Error::DatabaseLockError),
            })
        );
    }
}
