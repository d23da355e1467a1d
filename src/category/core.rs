//! Defines the category model and its database queries.

use std::{collections::HashMap, fmt::Display};

use rusqlite::{Connection, Row};

use crate::{
    Error, UserID,
    category::CategoryIcon,
    color::Color,
    error::{is_foreign_key_violation, is_unique_violation},
    ownership::{Owned, delete_owned, get_all_owned, get_owned},
    validation::bounded_text,
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a category.
pub type CategoryId = i64;

/// A validated category name between 3 and 50 characters long.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// The number of characters allowed in a category name.
    pub const LENGTH: (usize, usize) = (3, 50);

    /// Create a category name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidLength] if the trimmed name is too short or too long.
    pub fn new(name: &str) -> Result<Self, Error> {
        bounded_text("Category name", name, Self::LENGTH.0, Self::LENGTH.1).map(Self)
    }

    /// Create a category name without validation.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A grouping for transactions and budgets, e.g. "Groceries".
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub color: Color,
    pub icon: CategoryIcon,
}

impl Owned for Category {
    const TABLE: &'static str = "category";
    const COLUMNS: &'static str = "id, name, color, icon";

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        let raw_name: String = row.get(1)?;

        Ok(Self {
            id: row.get(0)?,
            name: CategoryName::new_unchecked(&raw_name),
            color: row.get(2)?,
            icon: row.get(3)?,
        })
    }
}

/// The user editable fields of a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub color: Color,
    pub icon: CategoryIcon,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE,
            color TEXT NOT NULL,
            icon TEXT NOT NULL,
            user_id INTEGER NOT NULL,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_id ON category(user_id);",
    )?;

    Ok(())
}

fn map_duplicate_name(error: rusqlite::Error, name: &CategoryName) -> Error {
    if is_unique_violation(&error) {
        Error::DuplicateCategoryName(name.to_string())
    } else {
        error.into()
    }
}

/// Create a category for `user_id`.
///
/// # Errors
///
/// Returns [Error::DuplicateCategoryName] if the user already has a category with the same name.
pub fn create_category(
    category: NewCategory,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (name, color, icon, user_id) VALUES (?1, ?2, ?3, ?4)",
            (
                category.name.as_ref(),
                category.color,
                category.icon,
                user_id.as_i64(),
            ),
        )
        .map_err(|error| map_duplicate_name(error, &category.name))?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        name: category.name,
        color: category.color,
        icon: category.icon,
    })
}

/// Get one of the user's categories.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not exist or belongs to another user.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    get_owned(category_id, user_id, connection)
}

/// Get all of the user's categories ordered by name.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    get_all_owned(user_id, "name ASC", connection)
}

/// Update one of the user's categories.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not belong to `user_id` and
/// [Error::DuplicateCategoryName] if the new name is taken.
pub fn update_category(
    category_id: CategoryId,
    update: NewCategory,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let rows_affected = connection
        .execute(
            "UPDATE category SET name = ?1, color = ?2, icon = ?3 WHERE id = ?4 AND user_id = ?5",
            (
                update.name.as_ref(),
                update.color,
                update.icon,
                category_id,
                user_id.as_i64(),
            ),
        )
        .map_err(|error| map_duplicate_name(error, &update.name))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(Category {
        id: category_id,
        name: update.name,
        color: update.color,
        icon: update.icon,
    })
}

/// Delete one of the user's categories.
///
/// # Errors
///
/// Returns [Error::NotFound] if the category does not belong to `user_id` and
/// [Error::CategoryInUse] if transactions or budgets still refer to it.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    get_category(category_id, user_id, connection)?;

    let is_in_use: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM \"transaction\" WHERE category_id = ?1)
            OR EXISTS(SELECT 1 FROM budget WHERE category_id = ?1)",
        (category_id,),
        |row| row.get(0),
    )?;

    if is_in_use {
        return Err(Error::CategoryInUse);
    }

    delete_owned::<Category>(category_id, user_id, connection).map_err(|error| match error {
        Error::SqlError(ref sql_error) if is_foreign_key_violation(sql_error) => {
            Error::CategoryInUse
        }
        error => error,
    })
}

/// Count the user's transactions in each category.
///
/// Categories without transactions are left out of the map.
pub fn count_transactions_per_category(
    user_id: UserID,
    connection: &Connection,
) -> Result<HashMap<CategoryId, u32>, Error> {
    let result: Result<HashMap<CategoryId, u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT category_id, COUNT(1) FROM \"transaction\" WHERE user_id = ?1 GROUP BY category_id",
        )?
        .query_map((user_id.as_i64(),), |row| {
            let category_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((category_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

// ============================================================================
// TESTS
// ============================================================================
