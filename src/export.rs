//! Writes a user's transactions as CSV for download.

use std::collections::HashMap;

use time::{format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, category::Category, database_id::CategoryId, transaction::Transaction};

/// The category column value for transactions without a known category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

const HEADER: [&str; 5] = ["date", "type", "category", "amount", "description"];
const TIMESTAMP_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Write `transactions` as CSV with one row per transaction, in the order given.
///
/// Category IDs are resolved to names with `categories`. Transactions with no
/// category, or with a category missing from `categories`, are labelled
/// [UNCATEGORIZED_LABEL]. Amounts are written with two decimal places and
/// timestamps in the offset they were recorded with.
///
/// # Errors
/// Returns [Error::CsvError] if a row cannot be written.
pub fn transactions_to_csv(
    transactions: &[Transaction],
    categories: &[Category],
) -> Result<Vec<u8>, Error> {
    let category_names: HashMap<CategoryId, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_ref()))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for transaction in transactions {
        let category = transaction
            .category_id
            .and_then(|category_id| category_names.get(&category_id).copied())
            .unwrap_or(UNCATEGORIZED_LABEL);
        let timestamp = transaction
            .timestamp
            .format(TIMESTAMP_FORMAT)
            .map_err(|error| Error::CsvError(error.to_string()))?;
        let amount = format!("{:.2}", transaction.amount);

        writer.write_record([
            timestamp.as_str(),
            transaction.transaction_type.as_str(),
            category,
            amount.as_str(),
            transaction.description.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}
