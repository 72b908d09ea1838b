//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/budgets/{budget_id}', use [format_endpoint].

/// The route for creating and listing categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route for recording and listing transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for downloading transactions in a date range as CSV.
pub const TRANSACTIONS_EXPORT: &str = "/api/transactions/export";
/// The route for creating and listing budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route for deleting a budget.
pub const BUDGET: &str = "/api/budgets/{budget_id}";
/// The route for checking a budget's spent amount against its transactions.
pub const BUDGET_CONSISTENCY: &str = "/api/budgets/{budget_id}/consistency";
/// The route for requesting statistics over a date range.
pub const STATISTICS: &str = "/api/statistics";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// Only the first parameter is replaced. Paths without a parameter are
/// returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
