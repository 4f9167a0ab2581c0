//! Database initialisation and helpers shared by the table modules.

use std::str::FromStr;

use rusqlite::{Connection, Row, Transaction as SqlTransaction, TransactionBehavior, types::Type};

use crate::{
    Error, category::create_category_table, loyalty_card::create_loyalty_card_table,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create all of the database tables for the application.
///
/// Foreign key enforcement is switched on for `connection` and the tables are
/// created inside a single exclusive transaction.
///
/// # Errors
/// This function may return a [Error::SqlError] if an SQL error occurred.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_loyalty_card_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Read the text column at `index` and parse it with [FromStr].
///
/// A value that does not parse is reported as a
/// [rusqlite::Error::FromSqlConversionFailure] so that it surfaces like any
/// other type mismatch between the schema and the Rust model.
pub(crate) fn parse_text_column<T>(row: &Row, index: usize) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(index)?;

    raw.parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_creates_tables() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        let mut tables: Vec<String> = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        tables.retain(|name| !name.starts_with("sqlite_"));

        assert_eq!(
            tables,
            vec!["category", "loyalty_card", "transaction", "user"]
        );
    }

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("Could not initialize database");

        assert!(initialize(&connection).is_ok());
    }

    #[test]
    fn initialize_enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let enabled: bool = connection
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();

        assert!(enabled);
    }
}
