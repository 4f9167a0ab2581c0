//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    CategoryId, Error, TransactionId, category::get_visible_category, db::parse_text_column,
    user::UserId,
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user the transaction belongs to.
    pub owner: UserId,
    /// The ID of the category the transaction belongs to.
    pub category_id: CategoryId,
    /// The amount of money spent (negative) or earned (positive).
    pub amount: Decimal,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Whether the transaction is a template that repeats every month.
    pub is_recurring: bool,
    /// Free form notes.
    pub notes: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        owner: UserId,
        category_id: CategoryId,
        amount: Decimal,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            owner,
            category_id,
            amount,
            date,
            description: String::new(),
            is_recurring: false,
            notes: String::new(),
        }
    }

    /// Whether money was earned.
    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Whether money was spent.
    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// The size of the amount regardless of direction.
    pub fn amount_abs(&self) -> Decimal {
        self.amount.abs()
    }

    /// The amount with an explicit sign and two decimal places, e.g. "+€12.50" or "-€8.00".
    pub fn display_amount(&self) -> String {
        let sign = if self.is_income() { '+' } else { '-' };

        format!("{sign}€{}", to_two_places(self.amount_abs()))
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// use rust_decimal_macros::dec;
/// use time::macros::date;
///
/// let rent = Transaction::build(user.id, category.id, dec!(-850.00), date!(2025 - 01 - 01))
///     .description("Monthly Rent")
///     .recurring(true);
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The user the transaction belongs to.
    pub owner: UserId,

    /// The category of the transaction, e.g. "Groceries", "Salary", "Rent".
    ///
    /// The category must be one of the owner's personal categories or a
    /// global category.
    pub category_id: CategoryId,

    /// The monetary amount of the transaction.
    ///
    /// Positive values represent income, negative values represent
    /// expenses. Amounts are stored with two decimal places.
    pub amount: Decimal,

    /// The date when the transaction occurred.
    pub date: Date,

    /// A human-readable description of the transaction.
    pub description: String,

    /// Whether the transaction repeats every month.
    ///
    /// Recurring transactions act as templates: each month a non-recurring
    /// copy is created by [crate::recurring::project_recurring_transactions].
    pub is_recurring: bool,

    /// Free form notes.
    pub notes: String,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the notes for the transaction.
    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_owned();
        self
    }

    /// Mark the transaction as repeating every month.
    pub fn recurring(mut self, is_recurring: bool) -> Self {
        self.is_recurring = is_recurring;
        self
    }
}

/// The direction of money chosen when entering a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

/// Turn an entered amount, which is always positive, into a signed amount
/// where expenses are negative.
///
/// # Errors
/// Returns an [Error::InvalidAmount] if `amount` is less than 0.01.
pub fn signed_amount(kind: TransactionKind, amount: Decimal) -> Result<Decimal, Error> {
    if amount < Decimal::new(1, 2) {
        return Err(Error::InvalidAmount(format!(
            "{amount} must be at least 0.01"
        )));
    }

    match kind {
        TransactionKind::Income => Ok(amount),
        TransactionKind::Expense => Ok(-amount),
    }
}

/// The fields that identify a transaction when looking for duplicates.
///
/// Notes and the recurring flag are not part of the key, so a manually
/// entered transaction with the same fields counts as a duplicate.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateKey {
    /// The user the transaction belongs to.
    pub owner: UserId,
    /// The signed amount.
    pub amount: Decimal,
    /// The category of the transaction.
    pub category_id: CategoryId,
    /// The exact description.
    pub description: String,
    /// The transaction date.
    pub date: Date,
}

impl DuplicateKey {
    /// The key of `transaction` if it were dated `date` instead.
    pub fn for_date(transaction: &Transaction, date: Date) -> Self {
        Self {
            owner: transaction.owner,
            amount: transaction.amount,
            category_id: transaction.category_id,
            description: transaction.description.clone(),
            date,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str = "SELECT id, user_id, category_id, amount, date, description, is_recurring, notes FROM \"transaction\"";

/// Create a new transaction in the database from a builder.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category does not exist or belongs to another user,
/// - [Error::InvalidOwner] if the owner is not a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    get_visible_category(builder.category_id, builder.owner, connection)?;

    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (user_id, category_id, amount, date, description, is_recurring, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, category_id, amount, date, description, is_recurring, notes",
        )?
        .query_row(
            (
                builder.owner.as_i64(),
                builder.category_id,
                to_two_places(builder.amount),
                builder.date,
                &builder.description,
                builder.is_recurring,
                &builder.notes,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidOwner,
            error => error.into(),
        })?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!("{SELECT_COLUMNS} WHERE id = :id"))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Replace the fields of the transaction `id` owned by `builder.owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if the user has no transaction with the ID `id`,
/// - [Error::InvalidCategory] if the new category may not be used by the owner,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    get_visible_category(builder.category_id, builder.owner, connection)?;

    connection
        .prepare(
            "UPDATE \"transaction\"
             SET category_id = ?1, amount = ?2, date = ?3, description = ?4, is_recurring = ?5, notes = ?6
             WHERE id = ?7 AND user_id = ?8
             RETURNING id, user_id, category_id, amount, date, description, is_recurring, notes",
        )?
        .query_row(
            (
                builder.category_id,
                to_two_places(builder.amount),
                builder.date,
                &builder.description,
                builder.is_recurring,
                &builder.notes,
                id,
                builder.owner.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })
}

/// Delete the transaction `id` if it belongs to `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if the user has no transaction with the ID `id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    owner: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Get every transaction flagged as recurring, oldest first.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_recurring_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE is_recurring = 1 ORDER BY id ASC"
        ))?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Check whether a transaction matching `key` exactly already exists.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn transaction_exists(key: &DuplicateKey, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(
                SELECT 1 FROM \"transaction\"
                WHERE user_id = ?1 AND amount = ?2 AND category_id = ?3 AND description = ?4 AND date = ?5
            )",
            (
                key.owner.as_i64(),
                to_two_places(key.amount),
                key.category_id,
                &key.description,
                key.date,
            ),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                amount TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                is_recurring INTEGER NOT NULL DEFAULT 0,
                notes TEXT NOT NULL DEFAULT '',
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_category_date ON \"transaction\"(category_id, date);",
        (),
    )?;

    // Used to find the templates for recurring transactions.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_recurring ON \"transaction\"(is_recurring);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let owner = UserId::new(row.get(1)?);
    let category_id = row.get(2)?;
    let amount = parse_text_column(row, 3)?;
    let date = row.get(4)?;
    let description = row.get(5)?;
    let is_recurring = row.get(6)?;
    let notes = row.get(7)?;

    Ok(Transaction {
        id,
        owner,
        category_id,
        amount,
        date,
        description,
        is_recurring,
        notes,
    })
}

/// Format `amount` rounded to exactly two decimal places.
///
/// Amounts are stored in this form so that equal amounts compare equal as text.
pub(crate) fn to_two_places(amount: Decimal) -> String {
    let mut amount = amount.round_dp(2);
    amount.rescale(2);
    amount.to_string()
}

// ============================================================================
// TESTS
// ============================================================================
