//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    CategoryId, Error,
    category::{Category, CategoryKind, CategoryName, CategoryScope, Color, NewCategory},
    db::parse_text_column,
    user::UserId,
};

const SELECT_COLUMNS: &str = "SELECT id, name, kind, scope, user_id, color FROM category";

/// Create a category and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::PersonalCategoryWithoutOwner] if a personal category has no owner,
/// - [Error::DuplicateCategory] if the owner already has a category with the same name and kind,
/// - [Error::InvalidOwner] if the owner is not a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(new_category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    if new_category.scope == CategoryScope::Personal && new_category.owner.is_none() {
        return Err(Error::PersonalCategoryWithoutOwner);
    }

    connection
        .execute(
            "INSERT INTO category (name, kind, scope, user_id, color) VALUES (?1, ?2, ?3, ?4, ?5);",
            (
                new_category.name.as_ref(),
                new_category.kind.code(),
                new_category.scope.code(),
                new_category.owner.map(|owner| owner.as_i64()),
                new_category.color.as_ref(),
            ),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategory(new_category.name.to_string()),
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::InvalidOwner,
            error => error.into(),
        })?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name: new_category.name,
        kind: new_category.kind,
        scope: new_category.scope,
        owner: new_category.owner,
        color: new_category.color,
    })
}

/// Retrieve a single category by ID.
///
/// # Errors
/// Returns [Error::NotFound] if `category_id` does not refer to a category.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare(&format!("{SELECT_COLUMNS} WHERE id = :id;"))?
        .query_row(&[(":id", &category_id)], map_category_row)
        .map_err(|error| error.into())
}

/// Retrieve a category by ID if `user_id` may use it.
///
/// # Errors
/// Returns [Error::InvalidCategory] if the category does not exist or is
/// another user's personal category.
pub fn get_visible_category(
    category_id: CategoryId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Category, Error> {
    match get_category(category_id, connection) {
        Ok(category) if category.is_visible_to(user_id) => Ok(category),
        Ok(_) | Err(Error::NotFound) => Err(Error::InvalidCategory(category_id)),
        Err(error) => Err(error),
    }
}

/// Retrieve the categories a user can choose from: their own personal
/// categories plus every global category, ordered by kind and then name.
pub fn get_categories_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE user_id = :user_id OR scope = 'GLOBAL' ORDER BY kind ASC, name ASC;"
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Find the user's personal category called `name` of the given kind,
/// creating it with `color` if it does not exist.
///
/// Returns the category and whether it was created.
pub fn get_or_create_personal_category(
    name: CategoryName,
    kind: CategoryKind,
    owner: UserId,
    color: Color,
    connection: &Connection,
) -> Result<(Category, bool), Error> {
    let existing = connection
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE name = ?1 AND kind = ?2 AND user_id = ?3;"
        ))?
        .query_row(
            (name.as_ref(), kind.code(), owner.as_i64()),
            map_category_row,
        );

    match existing {
        Ok(category) => Ok((category, false)),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            let category =
                create_category(NewCategory::personal(name, kind, owner).color(color), connection)?;
            tracing::debug!("Created personal category {category} for user {owner}");
            Ok((category, true))
        }
        Err(error) => Err(error.into()),
    }
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('IN', 'EX')),
            scope TEXT NOT NULL CHECK (scope IN ('GLOBAL', 'PERSONAL')),
            user_id INTEGER,
            color TEXT NOT NULL DEFAULT '#3B82F6',
            UNIQUE(name, user_id, kind),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_scope ON category(user_id, scope);

        -- NULL owners never collide in the table constraint above.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_category_global_name_kind
            ON category(name, kind) WHERE user_id IS NULL;",
    )?;

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let kind = parse_text_column(row, 2)?;
    let scope = parse_text_column(row, 3)?;
    let owner: Option<i64> = row.get(4)?;
    let color = parse_text_column(row, 5)?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        kind,
        scope,
        owner: owner.map(UserId::new),
        color,
    })
}
