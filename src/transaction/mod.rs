//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - Filtering and summarising the transactions of a user

mod core;
mod query;

pub use core::{
    DuplicateKey, Transaction, TransactionBuilder, TransactionKind, count_transactions,
    create_transaction, create_transaction_table, delete_transaction, get_recurring_transactions,
    get_transaction, map_transaction_row, signed_amount, transaction_exists, update_transaction,
};
pub use query::{TransactionFilter, TransactionSummary, query_transactions, summarize_transactions};

pub(crate) use core::to_two_places;
