//! Defines the label model and its database queries.

use std::{collections::HashMap, fmt::Display};

use rusqlite::{Connection, Row};

use crate::{
    Error, UserID,
    error::{is_foreign_key_violation, is_unique_violation},
    ownership::{Owned, delete_owned, get_all_owned, get_owned},
    validation::bounded_text,
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a label.
pub type LabelId = i64;

/// A validated label name between 3 and 50 characters long.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LabelName(String);

impl LabelName {
    /// The number of characters allowed in a label name.
    pub const LENGTH: (usize, usize) = (3, 50);

    /// Create a label name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidLength] if the trimmed name is too short or too long.
    pub fn new(name: &str) -> Result<Self, Error> {
        bounded_text("Label name", name, Self::LENGTH.0, Self::LENGTH.1).map(Self)
    }

    /// Create a label name without validation.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for LabelName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for LabelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A free-form tag that can be attached to any number of transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub id: LabelId,
    pub name: LabelName,
}

impl Owned for Label {
    const TABLE: &'static str = "label";
    const COLUMNS: &'static str = "id, name";

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        let raw_name: String = row.get(1)?;

        Ok(Self {
            id: row.get(0)?,
            name: LabelName::new_unchecked(&raw_name),
        })
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the label table.
pub fn create_label_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS label (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE,
            user_id INTEGER NOT NULL,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_label_user_id ON label(user_id);",
    )?;

    Ok(())
}

fn map_duplicate_name(error: rusqlite::Error, name: &LabelName) -> Error {
    if is_unique_violation(&error) {
        Error::DuplicateLabelName(name.to_string())
    } else {
        error.into()
    }
}

/// Create a label for `user_id`.
///
/// # Errors
///
/// Returns [Error::DuplicateLabelName] if the user already has a label with the same name.
pub fn create_label(name: LabelName, user_id: UserID, connection: &Connection) -> Result<Label, Error> {
    connection
        .execute(
            "INSERT INTO label (name, user_id) VALUES (?1, ?2)",
            (name.as_ref(), user_id.as_i64()),
        )
        .map_err(|error| map_duplicate_name(error, &name))?;

    Ok(Label {
        id: connection.last_insert_rowid(),
        name,
    })
}

/// Get one of the user's labels.
///
/// # Errors
///
/// Returns [Error::NotFound] if the label does not exist or belongs to another user.
pub fn get_label(label_id: LabelId, user_id: UserID, connection: &Connection) -> Result<Label, Error> {
    get_owned(label_id, user_id, connection)
}

/// Get all of the user's labels ordered by name.
pub fn get_labels(user_id: UserID, connection: &Connection) -> Result<Vec<Label>, Error> {
    get_all_owned(user_id, "name ASC", connection)
}

/// Rename one of the user's labels.
///
/// # Errors
///
/// Returns [Error::NotFound] if the label does not belong to `user_id` and
/// [Error::DuplicateLabelName] if the new name is taken.
pub fn update_label(
    label_id: LabelId,
    name: LabelName,
    user_id: UserID,
    connection: &Connection,
) -> Result<Label, Error> {
    let rows_affected = connection
        .execute(
            "UPDATE label SET name = ?1 WHERE id = ?2 AND user_id = ?3",
            (name.as_ref(), label_id, user_id.as_i64()),
        )
        .map_err(|error| map_duplicate_name(error, &name))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(Label { id: label_id, name })
}

/// Delete one of the user's labels.
///
/// # Errors
///
/// Returns [Error::NotFound] if the label does not belong to `user_id` and
/// [Error::LabelInUse] if any transaction carries it.
pub fn delete_label(label_id: LabelId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    get_label(label_id, user_id, connection)?;

    let is_in_use: bool = connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM transaction_label WHERE label_id = ?1)",
        (label_id,),
        |row| row.get(0),
    )?;

    if is_in_use {
        return Err(Error::LabelInUse);
    }

    delete_owned::<Label>(label_id, user_id, connection).map_err(|error| match error {
        Error::SqlError(ref sql_error) if is_foreign_key_violation(sql_error) => Error::LabelInUse,
        error => error,
    })
}

/// Count the user's transactions carrying each label.
///
/// Labels without transactions are left out of the map.
pub fn count_transactions_per_label(
    user_id: UserID,
    connection: &Connection,
) -> Result<HashMap<LabelId, u32>, Error> {
    let result: Result<HashMap<LabelId, u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT transaction_label.label_id, COUNT(1)
            FROM transaction_label
            INNER JOIN label ON label.id = transaction_label.label_id
            WHERE label.user_id = ?1
            GROUP BY transaction_label.label_id",
        )?
        .query_map((user_id.as_i64(),), |row| {
            let label_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((label_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

// ============================================================================
// TESTS
// ============================================================================
