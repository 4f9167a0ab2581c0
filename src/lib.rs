//! Finance Tracker is a personal finance library for recording income and
//! expenses against categories, summarising them on a dashboard, projecting
//! recurring monthly transactions and storing loyalty cards with generated
//! barcodes.
//!
//! All state lives in a SQLite database. Call [initialize_db] on a fresh
//! connection before using any of the functions in this crate.

#![warn(missing_docs)]

pub mod barcode;
pub mod calendar;
pub mod category;
pub mod dashboard;
mod database_id;
mod db;
pub mod logging;
pub mod loyalty_card;
pub mod recurring;
pub mod timezone;
pub mod transaction;
pub mod user;

pub use database_id::{CategoryId, DatabaseId, LoyaltyCardId, TransactionId};
pub use db::initialize as initialize_db;

use crate::barcode::Symbology;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The category ID used for a transaction does not refer to a category
    /// that the owner of the transaction may use.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// The user ID used for a record does not refer to a registered user.
    #[error("the user ID does not refer to a registered user")]
    InvalidOwner,

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// A personal category was created without an owner.
    #[error("a personal category must belong to a user")]
    PersonalCategoryWithoutOwner,

    /// The user already has a category with the same name and kind.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategory(String),

    /// A colour string was not of the form `#RRGGBB`.
    #[error("\"{0}\" is not a valid hex colour, expected the form #RRGGBB")]
    InvalidColor(String),

    /// An amount could not be parsed or was not usable, e.g. zero for a
    /// user entered transaction.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A required text field was empty.
    #[error("{0} is required")]
    EmptyField(&'static str),

    /// A stored or user supplied code (e.g. a category kind) was not recognised.
    #[error("unknown code \"{0}\"")]
    UnknownCode(String),

    /// An empty string was used as a username.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// The code cannot be drawn with the chosen symbology.
    #[error("cannot generate {symbology} barcode: {reason}")]
    BarcodeEncoding {
        /// The symbology that was used to encode the code.
        symbology: Symbology,
        /// Why encoding failed.
        reason: String,
    },

    /// The rendered barcode could not be encoded as an image.
    #[error("could not encode barcode image: {0}")]
    ImageEncoding(String),

    /// The requested barcode resolution is outside the supported range.
    #[error("dpi must be between 1 and 1200, got {0}")]
    InvalidDpi(u32),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a loyalty card that does not exist
    #[error("tried to delete a loyalty card that is not in the database")]
    DeleteMissingLoyaltyCard,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
