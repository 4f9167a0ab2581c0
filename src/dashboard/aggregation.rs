//! Totals and per-category breakdowns for the dashboard.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{CategoryId, dashboard::transaction::Transaction};

/// The money spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryExpense {
    /// The name of the category.
    pub category_name: String,
    /// The chart colour of the category.
    pub category_color: String,
    /// The sum of the expenses, always negative.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// How many expenses were summed.
    pub count: usize,
}

/// Income, expense and balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(super) struct Totals {
    pub income: Decimal,
    pub expenses: Decimal,
}

impl Totals {
    pub fn balance(&self) -> Decimal {
        self.income - self.expenses
    }
}

/// Sum positive amounts as income and negative amounts as expenses.
///
/// Expenses are returned as a positive number.
pub(super) fn calculate_totals(transactions: &[Transaction]) -> Totals {
    transactions
        .iter()
        .fold(Totals::default(), |mut totals, transaction| {
            if transaction.amount > Decimal::ZERO {
                totals.income += transaction.amount;
            } else {
                totals.expenses -= transaction.amount;
            }
            totals
        })
}

/// Group expenses by category, largest spend first.
///
/// Categories whose expenses do not add up to a negative total are left out.
pub(super) fn group_expenses_by_category(transactions: &[Transaction]) -> Vec<CategoryExpense> {
    let mut groups: HashMap<CategoryId, CategoryExpense> = HashMap::new();

    for transaction in transactions.iter().filter(|t| t.amount < Decimal::ZERO) {
        let group = groups
            .entry(transaction.category_id)
            .or_insert_with(|| CategoryExpense {
                category_name: transaction.category_name.clone(),
                category_color: transaction.category_color.clone(),
                total: Decimal::ZERO,
                count: 0,
            });
        group.total += transaction.amount;
        group.count += 1;
    }

    let mut expenses: Vec<_> = groups
        .into_values()
        .filter(|group| group.total < Decimal::ZERO)
        .collect();
    expenses.sort_by(|a, b| {
        a.total
            .cmp(&b.total)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });

    expenses
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::dashboard::transaction::Transaction;

    use super::{calculate_totals, group_expenses_by_category};

    fn transaction(amount: Decimal, category_id: i64, name: &str) -> Transaction {
        Transaction {
            amount,
            category_id,
            category_name: name.to_owned(),
            category_color: "#3B82F6".to_owned(),
        }
    }

    #[test]
    fn totals_split_income_and_expenses() {
        let transactions = [
            transaction(dec!(2500.00), 1, "Salary"),
            transaction(dec!(-850.00), 2, "Rent"),
            transaction(dec!(-45.50), 3, "Groceries"),
            transaction(dec!(-12.25), 3, "Groceries"),
        ];

        let totals = calculate_totals(&transactions);

        assert_eq!(totals.income, dec!(2500.00));
        assert_eq!(totals.expenses, dec!(907.75));
        assert_eq!(totals.balance(), dec!(1592.25));
    }

    #[test]
    fn totals_of_nothing_are_zero() {
        let totals = calculate_totals(&[]);

        assert_eq!(totals.income, Decimal::ZERO);
        assert_eq!(totals.expenses, Decimal::ZERO);
        assert_eq!(totals.balance(), Decimal::ZERO);
    }

    #[test]
    fn expenses_grouped_most_negative_first() {
        let transactions = [
            transaction(dec!(2500.00), 1, "Salary"),
            transaction(dec!(-45.50), 3, "Groceries"),
            transaction(dec!(-850.00), 2, "Rent"),
            transaction(dec!(-12.25), 3, "Groceries"),
        ];

        let groups = group_expenses_by_category(&transactions);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category_name, "Rent");
        assert_eq!(groups[0].total, dec!(-850.00));
        assert_eq!(groups[0].count, 1);
        assert_eq!(groups[1].category_name, "Groceries");
        assert_eq!(groups[1].total, dec!(-57.75));
        assert_eq!(groups[1].count, 2);
    }

    #[test]
    fn categories_with_the_same_name_are_kept_apart() {
        let transactions = [
            transaction(dec!(-10), 1, "Rent"),
            transaction(dec!(-20), 2, "Rent"),
        ];

        let groups = group_expenses_by_category(&transactions);

        assert_eq!(groups.len(), 2);
    }
}
