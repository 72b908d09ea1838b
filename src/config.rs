//! Settings that control how the ledger validates requests.

use crate::date_range::DEFAULT_MAX_RANGE_DAYS;

/// The config for the [Ledger](crate::Ledger).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// The maximum number of days a statistics query may span.
    pub max_range_days: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_range_days: DEFAULT_MAX_RANGE_DAYS,
        }
    }
}
