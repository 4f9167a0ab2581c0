//! Defines the loyalty card model and its database queries.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::Serialize;

use crate::{
    Error, LoyaltyCardId,
    barcode::{DEFAULT_DPI, Symbology, detect_type, generate_barcode, validate_code_for_tag},
    db::parse_text_column,
    user::UserId,
};

/// A store loyalty or membership card with a pre-rendered barcode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoyaltyCard {
    /// The ID of the card.
    pub id: LoyaltyCardId,
    /// The user the card belongs to.
    pub owner: UserId,
    /// The store or scheme the card is for, e.g. "Conad".
    pub store_name: String,
    /// The number printed on the card.
    pub card_number: String,
    /// The symbology the barcode was drawn with, detected from the card number.
    pub barcode_type: Symbology,
    /// The file name the barcode image is offered under.
    pub barcode_filename: String,
    /// The PNG encoded barcode.
    #[serde(skip_serializing)]
    pub barcode_png: Vec<u8>,
    /// Free form notes.
    pub notes: String,
}

impl Display for LoyaltyCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.store_name, self.card_number)
    }
}

/// The data needed to add a loyalty card.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoyaltyCard {
    /// The user the card belongs to.
    pub owner: UserId,
    /// The store or scheme the card is for.
    pub store_name: String,
    /// The number printed on the card.
    pub card_number: String,
    /// Free form notes.
    pub notes: String,
}

/// The answer to "can this code be drawn as that barcode type?".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarcodeValidation {
    /// Whether the code fits the barcode type.
    pub valid: bool,
    /// A message to show next to the code.
    pub message: &'static str,
}

/// Check whether `code` fits the barcode type named by `tag`.
///
/// Unknown tags are reported as invalid.
pub fn validate_barcode(code: &str, tag: &str) -> BarcodeValidation {
    let valid = validate_code_for_tag(code, tag);

    BarcodeValidation {
        valid,
        message: if valid {
            "Valid code"
        } else {
            "Invalid code for this format"
        },
    }
}

/// Add a loyalty card for `new_card.owner`.
///
/// The store name and card number are trimmed. The barcode type is detected
/// from the card number and the barcode image is generated before anything
/// is written, so a card is only stored together with its image.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyField] if the store name or card number is blank,
/// - [Error::BarcodeEncoding] or [Error::ImageEncoding] if the barcode could not be drawn,
/// - [Error::InvalidOwner] if the owner is not a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_loyalty_card(
    new_card: NewLoyaltyCard,
    connection: &Connection,
) -> Result<LoyaltyCard, Error> {
    let store_name = new_card.store_name.trim();
    let card_number = new_card.card_number.trim();

    if store_name.is_empty() {
        return Err(Error::EmptyField("store name"));
    }

    if card_number.is_empty() {
        return Err(Error::EmptyField("card number"));
    }

    let barcode = generate_barcode(card_number, Some(detect_type(card_number)), DEFAULT_DPI)?;
    let barcode_filename = format!("{store_name}_{card_number}.png");

    let card = connection
        .prepare(
            "INSERT INTO loyalty_card (user_id, store_name, card_number, barcode_type, barcode_filename, barcode_png, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, user_id, store_name, card_number, barcode_type, barcode_filename, barcode_png, notes",
        )?
        .query_row(
            (
                new_card.owner.as_i64(),
                store_name,
                card_number,
                barcode.symbology.tag(),
                &barcode_filename,
                &barcode.png,
                &new_card.notes,
            ),
            map_loyalty_card_row,
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

    tracing::info!(
        "Added loyalty card {} for user {} with a {} barcode",
        card.id,
        card.owner,
        card.barcode_type
    );

    Ok(card)
}

/// Retrieve the loyalty card `id` owned by `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the user has no card with the ID `id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_loyalty_card(
    id: LoyaltyCardId,
    owner: UserId,
    connection: &Connection,
) -> Result<LoyaltyCard, Error> {
    let card = connection
        .prepare(
            "SELECT id, user_id, store_name, card_number, barcode_type, barcode_filename, barcode_png, notes
             FROM loyalty_card WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(
            &[(":id", &id), (":user_id", &owner.as_i64())],
            map_loyalty_card_row,
        )?;

    Ok(card)
}

/// Get all of the loyalty cards owned by `owner`, most recently added first.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_loyalty_cards(owner: UserId, connection: &Connection) -> Result<Vec<LoyaltyCard>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, store_name, card_number, barcode_type, barcode_filename, barcode_png, notes
             FROM loyalty_card WHERE user_id = :user_id ORDER BY id DESC",
        )?
        .query_map(&[(":user_id", &owner.as_i64())], map_loyalty_card_row)?
        .map(|maybe_card| maybe_card.map_err(|error| error.into()))
        .collect()
}

/// Delete the loyalty card `id` if it belongs to `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingLoyaltyCard] if the user has no card with the ID `id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_loyalty_card(
    id: LoyaltyCardId,
    owner: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM loyalty_card WHERE id = ?1 AND user_id = ?2",
        (id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingLoyaltyCard);
    }

    tracing::info!("Deleted loyalty card {id} for user {owner}");

    Ok(())
}

/// Create the loyalty card table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_loyalty_card_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS loyalty_card (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                store_name TEXT NOT NULL,
                card_number TEXT NOT NULL,
                barcode_type TEXT NOT NULL DEFAULT 'code128'
                    CHECK (barcode_type IN ('code128', 'ean13', 'ean8', 'upca', 'code39', 'itf')),
                barcode_filename TEXT NOT NULL DEFAULT '',
                barcode_png BLOB NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_loyalty_card_user ON loyalty_card(user_id);",
        (),
    )?;

    Ok(())
}

fn map_loyalty_card_row(row: &Row) -> Result<LoyaltyCard, rusqlite::Error> {
    Ok(LoyaltyCard {
        id: row.get(0)?,
        owner: UserId::new(row.get(1)?),
        store_name: row.get(2)?,
        card_number: row.get(3)?,
        barcode_type: parse_text_column(row, 4)?,
        barcode_filename: row.get(5)?,
        barcode_png: row.get(6)?,
        notes: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        barcode::Symbology,
        db::initialize,
        loyalty_card::{
            NewLoyaltyCard, create_loyalty_card, delete_loyalty_card, get_loyalty_card,
            get_loyalty_cards, validate_barcode,
        },
        user::{User, UserId, create_user},
    };

    fn get_test_connection() -> (Connection, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user("testuser", "test@example.com", &connection).unwrap();

        (connection, user)
    }

    fn new_card(owner: UserId, store_name: &str, card_number: &str) -> NewLoyaltyCard {
        NewLoyaltyCard {
            owner,
            store_name: store_name.to_owned(),
            card_number: card_number.to_owned(),
            notes: String::new(),
        }
    }

    #[test]
    fn create_detects_type_and_stores_barcode() {
        let (connection, user) = get_test_connection();

        let card = create_loyalty_card(
            NewLoyaltyCard {
                notes: "Test notes".to_owned(),
                ..new_card(user.id, "  Test Store ", " 1234567890123 ")
            },
            &connection,
        )
        .expect("Could not create loyalty card");

        assert_eq!(card.owner, user.id);
        assert_eq!(card.store_name, "Test Store");
        assert_eq!(card.card_number, "1234567890123");
        assert_eq!(card.barcode_type, Symbology::Ean13);
        assert_eq!(card.barcode_filename, "Test Store_1234567890123.png");
        assert!(!card.barcode_png.is_empty());
        assert_eq!(card.notes, "Test notes");
        assert_eq!(card.to_string(), "Test Store - 1234567890123");
    }

    #[test]
    fn create_uses_code128_for_text() {
        let (connection, user) = get_test_connection();

        let card = create_loyalty_card(new_card(user.id, "Library", "ABC123"), &connection).unwrap();

        assert_eq!(card.barcode_type, Symbology::Code128);
    }

    #[test]
    fn create_requires_store_name_and_card_number() {
        let (connection, user) = get_test_connection();

        assert_eq!(
            create_loyalty_card(new_card(user.id, "   ", "123"), &connection),
            Err(Error::EmptyField("store name"))
        );
        assert_eq!(
            create_loyalty_card(new_card(user.id, "Store", ""), &connection),
            Err(Error::EmptyField("card number"))
        );
        assert_eq!(get_loyalty_cards(user.id, &connection), Ok(vec![]));
    }

    #[test]
    fn create_fails_for_unknown_owner() {
        let (connection, user) = get_test_connection();
        let stranger = UserId::new(user.id.as_i64() + 1);

        assert_eq!(
            create_loyalty_card(new_card(stranger, "Store", "ABC"), &connection),
            Err(Error::InvalidOwner)
        );
    }

    #[test]
    fn get_is_scoped_to_owner() {
        let (connection, user) = get_test_connection();
        let other = create_user("other", "", &connection).unwrap();
        let card = create_loyalty_card(new_card(user.id, "Store", "ABC"), &connection).unwrap();

        assert_eq!(get_loyalty_card(card.id, user.id, &connection), Ok(card.clone()));
        assert_eq!(
            get_loyalty_card(card.id, other.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn list_is_newest_first_and_scoped() {
        let (connection, user) = get_test_connection();
        let other = create_user("other", "", &connection).unwrap();
        let first = create_loyalty_card(new_card(user.id, "Store A", "111"), &connection).unwrap();
        let second = create_loyalty_card(new_card(user.id, "Store B", "2222"), &connection).unwrap();
        create_loyalty_card(new_card(other.id, "Store C", "333"), &connection).unwrap();

        let cards = get_loyalty_cards(user.id, &connection).unwrap();

        assert_eq!(cards, vec![second, first]);
    }

    #[test]
    fn delete_removes_only_own_card() {
        let (connection, user) = get_test_connection();
        let other = create_user("other", "", &connection).unwrap();
        let card = create_loyalty_card(new_card(user.id, "Store", "ABC"), &connection).unwrap();

        assert_eq!(
            delete_loyalty_card(card.id, other.id, &connection),
            Err(Error::DeleteMissingLoyaltyCard)
        );
        assert_eq!(delete_loyalty_card(card.id, user.id, &connection), Ok(()));
        assert_eq!(
            get_loyalty_card(card.id, user.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn cards_are_deleted_with_their_owner() {
        let (connection, user) = get_test_connection();
        create_loyalty_card(new_card(user.id, "Store", "ABC"), &connection).unwrap();

        connection
            .execute("DELETE FROM user WHERE id = ?1", [user.id.as_i64()])
            .unwrap();

        let count: i64 = connection
            .query_row("SELECT COUNT(*) FROM loyalty_card", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn validate_barcode_messages() {
        let valid = validate_barcode("1234567890123", "ean13");
        let invalid = validate_barcode("12345", "ean13");
        let unknown = validate_barcode("12345", "qr");

        assert!(valid.valid);
        assert_eq!(valid.message, "Valid code");
        assert!(!invalid.valid);
        assert_eq!(invalid.message, "Invalid code for this format");
        assert!(!unknown.valid);
    }
}
