//! Filtering and summarising a user's transactions.

use rusqlite::{Connection, ToSql, params_from_iter};
use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::{CategoryId, Error, user::UserId};

use super::core::{Transaction, map_transaction_row};

/// Optional constraints on which transactions to list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions on or after this date.
    pub date_from: Option<Date>,
    /// Only include transactions on or before this date.
    pub date_to: Option<Date>,
    /// Only include transactions in this category.
    pub category_id: Option<CategoryId>,
    /// Case-insensitive text to look for in the description, notes or category name.
    pub search: Option<String>,
}

/// The number of transactions matching a filter and the sum of their amounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionSummary {
    /// How many transactions matched.
    pub count: usize,
    /// The sum of the matching amounts.
    pub total: Decimal,
}

impl TransactionSummary {
    /// Summarise `transactions`.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        Self {
            count: transactions.len(),
            total: transactions.iter().map(|transaction| transaction.amount).sum(),
        }
    }
}

/// Get the transactions of `user_id` that match `filter`, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn query_transactions(
    user_id: UserId,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let user_id = user_id.as_i64();
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|search| !search.is_empty())
        .map(|search| format!("%{}%", escape_like(search)));

    let mut clauses = vec!["t.user_id = ?".to_owned()];
    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(6);
    params.push(&user_id);

    if let Some(date_from) = &filter.date_from {
        clauses.push("t.date >= ?".to_owned());
        params.push(date_from);
    }

    if let Some(date_to) = &filter.date_to {
        clauses.push("t.date <= ?".to_owned());
        params.push(date_to);
    }

    if let Some(category_id) = &filter.category_id {
        clauses.push("t.category_id = ?".to_owned());
        params.push(category_id);
    }

    if let Some(pattern) = &search {
        clauses.push(
            "(t.description LIKE ? ESCAPE '\\' OR t.notes LIKE ? ESCAPE '\\' OR c.name LIKE ? ESCAPE '\\')"
                .to_owned(),
        );
        params.push(pattern);
        params.push(pattern);
        params.push(pattern);
    }

    // Sort by date, and then ID to keep transaction order stable after updates
    let query = format!(
        "SELECT t.id, t.user_id, t.category_id, t.amount, t.date, t.description, t.is_recurring, t.notes
        FROM \"transaction\" t
        INNER JOIN category c ON c.id = t.category_id
        WHERE {}
        ORDER BY t.date DESC, t.id DESC",
        clauses.join(" AND ")
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Count and total the transactions of `user_id` that match `filter`.
///
/// # Errors
/// Returns [Error::SqlError] if the underlying query fails.
pub fn summarize_transactions(
    user_id: UserId,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<TransactionSummary, Error> {
    let transactions = query_transactions(user_id, filter, connection)?;

    Ok(TransactionSummary::from_transactions(&transactions))
}

fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
