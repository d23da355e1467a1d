//! Owner-scoped access to records.
//!
//! Every record other than a user belongs to exactly one user. Lookups go
//! through [get_owned] so that a missing row and a row owned by someone else
//! both come back as [Error::NotFound].

use rusqlite::{Connection, Row, named_params};

use crate::{Error, UserID};

/// A record stored in a table with `id` and `user_id` columns.
pub trait Owned: Sized {
    /// The name of the table holding the records.
    const TABLE: &'static str;

    /// The columns read by [Owned::map_row], in order, without a trailing comma.
    const COLUMNS: &'static str;

    /// Convert a row with [Owned::COLUMNS] into the record.
    fn map_row(row: &Row) -> Result<Self, rusqlite::Error>;
}

/// Fetch the record of type `T` with `id` if it belongs to `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the record does not exist or belongs to another user.
pub fn get_owned<T: Owned>(id: i64, user_id: UserID, connection: &Connection) -> Result<T, Error> {
    connection
        .prepare(&format!(
            "SELECT {} FROM {} WHERE id = :id AND user_id = :user_id",
            T::COLUMNS,
            T::TABLE
        ))?
        .query_row(
            named_params! {":id": id, ":user_id": user_id.as_i64()},
            T::map_row,
        )
        .map_err(Error::from)
}

/// Fetch every record of type `T` that belongs to `user_id`, sorted by `order_by`.
pub fn get_all_owned<T: Owned>(
    user_id: UserID,
    order_by: &str,
    connection: &Connection,
) -> Result<Vec<T>, Error> {
    connection
        .prepare(&format!(
            "SELECT {} FROM {} WHERE user_id = :user_id ORDER BY {order_by}",
            T::COLUMNS,
            T::TABLE
        ))?
        .query_map(named_params! {":user_id": user_id.as_i64()}, T::map_row)?
        .map(|maybe_record| maybe_record.map_err(Error::from))
        .collect()
}

/// Delete the record of type `T` with `id` if it belongs to `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no row was deleted.
pub fn delete_owned<T: Owned>(
    id: i64,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        &format!("DELETE FROM {} WHERE id = ?1 AND user_id = ?2", T::TABLE),
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}
