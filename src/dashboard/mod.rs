//! Dashboard summaries of a user's income and spending.
//!
//! This module contains:
//! - Queries for the transactions in a date range
//! - Income, expense and balance totals
//! - A per-category breakdown of expenses for charting

mod aggregation;
mod transaction;

use std::ops::RangeInclusive;

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

pub use aggregation::CategoryExpense;

use crate::{Error, calendar, user::UserId};

/// Income, spending and where the money went over a date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// The first day included in the summary.
    pub start_date: Date,
    /// The last day included in the summary.
    pub end_date: Date,
    /// The sum of all income.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    /// The sum of all expenses as a positive number.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_expenses: Decimal,
    /// Income minus expenses.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    /// Expenses per category, largest spend first.
    pub expense_breakdown: Vec<CategoryExpense>,
}

impl DashboardSummary {
    /// The expense breakdown as a JSON array for chart libraries.
    ///
    /// # Errors
    /// Returns an [Error::JSONSerializationError] if serialization fails.
    pub fn expense_breakdown_json(&self) -> Result<String, Error> {
        serde_json::to_string(&self.expense_breakdown)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))
    }
}

/// The date range the dashboard shows when the caller gives no bounds.
///
/// Missing bounds default to the first and last day of the month containing `today`.
pub fn dashboard_date_range(
    start_date: Option<Date>,
    end_date: Option<Date>,
    today: Date,
) -> RangeInclusive<Date> {
    let current_month = calendar::month_range(today);

    let start = start_date.unwrap_or(*current_month.start());
    let end = end_date.unwrap_or(*current_month.end());

    start..=end
}

/// Summarise the transactions of `user_id` dated within `date_range`.
///
/// # Errors
/// Returns an [Error::SqlError] if the transactions could not be read.
pub fn get_dashboard_summary(
    user_id: UserId,
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<DashboardSummary, Error> {
    let transactions =
        transaction::get_transactions_in_date_range(user_id, date_range.clone(), connection)?;

    let totals = aggregation::calculate_totals(&transactions);
    let expense_breakdown = aggregation::group_expenses_by_category(&transactions);

    tracing::debug!(
        "Dashboard for user {user_id} from {} to {}: {} transactions in {} expense categories",
        date_range.start(),
        date_range.end(),
        transactions.len(),
        expense_breakdown.len()
    );

    Ok(DashboardSummary {
        start_date: *date_range.start(),
        end_date: *date_range.end(),
        total_income: totals.income,
        total_expenses: totals.expenses,
        balance: totals.balance(),
        expense_breakdown,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        category::{CategoryKind, CategoryName, Color, NewCategory, create_category},
        dashboard::{dashboard_date_range, get_dashboard_summary},
        db::initialize,
        transaction::{Transaction, create_transaction},
        user::create_user,
    };

    #[test]
    fn date_range_defaults_to_current_month() {
        let today = date!(2024 - 02 - 10);

        assert_eq!(
            dashboard_date_range(None, None, today),
            date!(2024 - 02 - 01)..=date!(2024 - 02 - 29)
        );
        assert_eq!(
            dashboard_date_range(Some(date!(2024 - 01 - 15)), None, today),
            date!(2024 - 01 - 15)..=date!(2024 - 02 - 29)
        );
    }

    #[test]
    fn summary_totals_and_breakdown() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user("test", "", &connection).unwrap();
        let salary = create_category(
            NewCategory::personal(
                CategoryName::new_unchecked("Salary"),
                CategoryKind::Income,
                user.id,
            ),
            &connection,
        )
        .unwrap();
        let rent = create_category(
            NewCategory::personal(
                CategoryName::new_unchecked("Rent"),
                CategoryKind::Expense,
                user.id,
            )
            .color(Color::new("#EF4444").unwrap()),
            &connection,
        )
        .unwrap();
        let groceries = create_category(
            NewCategory::global(
                CategoryName::new_unchecked("Groceries"),
                CategoryKind::Expense,
            ),
            &connection,
        )
        .unwrap();
        for (category, amount, date) in [
            (&salary, dec!(2500.00), date!(2025 - 10 - 25)),
            (&rent, dec!(-850.00), date!(2025 - 10 - 01)),
            (&groceries, dec!(-45.50), date!(2025 - 10 - 03)),
            (&groceries, dec!(-20.00), date!(2025 - 10 - 10)),
            (&groceries, dec!(-99.00), date!(2025 - 09 - 30)),
        ] {
            create_transaction(
                Transaction::build(user.id, category.id, amount, date),
                &connection,
            )
            .expect("Could not create transaction");
        }

        let summary = get_dashboard_summary(
            user.id,
            dashboard_date_range(None, None, date!(2025 - 10 - 16)),
            &connection,
        )
        .expect("Could not get dashboard summary");

        assert_eq!(summary.total_income, dec!(2500.00));
        assert_eq!(summary.total_expenses, dec!(915.50));
        assert_eq!(summary.balance, dec!(1584.50));
        assert_eq!(summary.expense_breakdown.len(), 2);
        assert_eq!(summary.expense_breakdown[0].category_name, "Rent");
        assert_eq!(summary.expense_breakdown[0].category_color, "#EF4444");
        assert_eq!(summary.expense_breakdown[1].total, dec!(-65.50));
        assert_eq!(summary.expense_breakdown[1].count, 2);
    }

    #[test]
    fn breakdown_json_uses_numbers() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user("test", "", &connection).unwrap();
        let rent = create_category(
            NewCategory::personal(
                CategoryName::new_unchecked("Rent"),
                CategoryKind::Expense,
                user.id,
            ),
            &connection,
        )
        .unwrap();
        create_transaction(
            Transaction::build(user.id, rent.id, dec!(-850.5), date!(2025 - 10 - 01)),
            &connection,
        )
        .unwrap();

        let summary = get_dashboard_summary(
            user.id,
            date!(2025 - 10 - 01)..=date!(2025 - 10 - 31),
            &connection,
        )
        .unwrap();

        assert_eq!(
            summary.expense_breakdown_json().unwrap(),
            r##"[{"category_name":"Rent","category_color":"#3B82F6","total":-850.5,"count":1}]"##
        );
    }

    #[test]
    fn empty_range_gives_zero_summary() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user("test", "", &connection).unwrap();

        let summary = get_dashboard_summary(
            user.id,
            date!(2025 - 10 - 01)..=date!(2025 - 10 - 31),
            &connection,
        )
        .unwrap();

        assert!(summary.total_income.is_zero());
        assert!(summary.balance.is_zero());
        assert!(summary.expense_breakdown.is_empty());
        assert_eq!(summary.expense_breakdown_json().unwrap(), "[]");
    }
}
