//! Code for creating the user table and fetching users from the database.
//!
//! Users own transactions, personal categories and loyalty cards. How users
//! authenticate is left to the surrounding application.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The unique name the user logs in with.
    pub username: String,
    /// The user's email address, may be empty.
    pub email: String,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL DEFAULT ''
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a:
/// - [Error::EmptyUsername] if `username` is empty or just whitespace,
/// - or [Error::SqlError] if an SQL related error occurred, e.g. the username is taken.
pub fn create_user(username: &str, email: &str, connection: &Connection) -> Result<User, Error> {
    let username = username.trim();

    if username.is_empty() {
        return Err(Error::EmptyUsername);
    }

    connection.execute(
        "INSERT INTO user (username, email) VALUES (?1, ?2)",
        (username, email.trim()),
    )?;

    let id = UserId::new(connection.last_insert_rowid());

    Ok(User {
        id,
        username: username.to_owned(),
        email: email.trim().to_owned(),
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserId, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, username, email FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(0)?;
    let username = row.get(1)?;
    let email = row.get(2)?;

    Ok(User {
        id: UserId::new(raw_id),
        username,
        email,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        user::{UserId, count_users, create_user, create_user_table, get_user_by_id},
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).expect("Could not create user table");
        connection
    }

    #[test]
    fn create_user_succeeds() {
        let connection = get_test_connection();

        let user = create_user("  alice ", "alice@example.com", &connection)
            .expect("Could not create user");

        assert!(user.id.as_i64() > 0);
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn create_user_fails_on_empty_username() {
        let connection = get_test_connection();

        let result = create_user(" \t", "", &connection);

        assert_eq!(result, Err(Error::EmptyUsername));
    }

    #[test]
    fn create_user_fails_on_duplicate_username() {
        let connection = get_test_connection();
        create_user("bob", "", &connection).expect("Could not create user");

        let result = create_user("bob", "", &connection);

        assert!(matches!(result, Err(Error::SqlError(_))));
    }

    #[test]
    fn get_user_succeeds() {
        let connection = get_test_connection();
        let inserted = create_user("carol", "c@example.com", &connection).unwrap();

        let selected = get_user_by_id(inserted.id, &connection);

        assert_eq!(selected, Ok(inserted));
    }

    #[test]
    fn get_user_with_invalid_id_returns_not_found() {
        let connection = get_test_connection();

        let selected = get_user_by_id(UserId::new(42), &connection);

        assert_eq!(selected, Err(Error::NotFound));
    }

    #[test]
    fn count_users_counts_all_users() {
        let connection = get_test_connection();
        for name in ["a", "b", "c"] {
            create_user(name, "", &connection).unwrap();
        }

        assert_eq!(count_users(&connection), Ok(3));
    }

    #[test]
    fn count_users_starts_at_zero() {
        let connection = get_test_connection();
        assert_eq!(count_users(&connection), Ok(0));

        create_user("dave", "d@example.com", &connection).expect("Could not create user");
        create_user("erin", "e@example.com", &connection).expect("Could not create user");

        assert_eq!(count_users(&connection), Ok(2));
    }
}
