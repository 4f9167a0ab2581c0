//! Database queries for retrieving dashboard transaction data.
//!
//! The dashboard only needs the amount and category of each transaction, so
//! this module reads a reduced view instead of the full transaction model.

use std::ops::RangeInclusive;

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::Date;

use crate::{CategoryId, Error, db::parse_text_column, user::UserId};

/// A simplified transaction view for dashboard aggregations.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Transaction {
    pub amount: Decimal,
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_color: String,
}

/// Gets the transactions of `user_id` within `date_range`, with their categories.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - a stored amount is not a valid decimal
pub(super) fn get_transactions_in_date_range(
    user_id: UserId,
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT t.amount, c.id, c.name, c.color
            FROM \"transaction\" t
            INNER JOIN category c ON c.id = t.category_id
            WHERE t.user_id = ?1 AND t.date BETWEEN ?2 AND ?3",
        )?
        .query_map(
            (user_id.as_i64(), date_range.start(), date_range.end()),
            |row| {
                Ok(Transaction {
                    amount: parse_text_column(row, 0)?,
                    category_id: row.get(1)?,
                    category_name: row.get(2)?,
                    category_color: row.get(3)?,
                })
            },
        )?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}
