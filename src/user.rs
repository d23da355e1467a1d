//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, PasswordHash, error::is_unique_violation, validation::bounded_text};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A validated, lower case email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    /// Parse and normalise an email address.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidEmail] if `raw` is not a valid address.
    pub fn new(raw: &str) -> Result<Self, Error> {
        let normalised = raw.trim().to_lowercase();

        if !EmailAddress::is_valid(&normalised) {
            return Err(Error::InvalidEmail(raw.to_owned()));
        }

        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The number of characters allowed in a first or last name.
pub const NAME_LENGTH: (usize, usize) = (3, 50);

/// Validate a first name.
pub fn validate_first_name(raw: &str) -> Result<String, Error> {
    bounded_text("First name", raw, NAME_LENGTH.0, NAME_LENGTH.1)
}

/// Validate a last name.
pub fn validate_last_name(raw: &str) -> Result<String, Error> {
    bounded_text("Last name", raw, NAME_LENGTH.0, NAME_LENGTH.1)
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The user's given name.
    pub first_name: String,
    /// The user's family name.
    pub last_name: String,
    /// The address the user logs in with.
    pub email: Email,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// When the user registered.
    pub created_at: OffsetDateTime,
}

/// The details needed to register a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The user's given name, already validated.
    pub first_name: String,
    /// The user's family name, already validated.
    pub last_name: String,
    /// The address the user logs in with.
    pub email: Email,
    /// The hash of the user's password.
    pub password_hash: PasswordHash,
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
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns a [Error::DuplicateEmail] if the email is already registered, or
/// [Error::SqlError] if another SQL related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection
        .execute(
            "INSERT INTO user (first_name, last_name, email, password, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                &new_user.first_name,
                &new_user.last_name,
                new_user.email.as_ref(),
                &new_user.password_hash,
                created_at,
            ),
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                Error::DuplicateEmail
            } else {
                error.into()
            }
        })?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        first_name: new_user.first_name,
        last_name: new_user.last_name,
        email: new_user.email,
        password_hash: new_user.password_hash,
        created_at,
    })
}

const SELECT_USER: &str =
    "SELECT id, first_name, last_name, email, password, created_at FROM user";

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: UserID::new(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: Email(row.get(3)?),
        password_hash: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(&format!("{SELECT_USER} WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user registered with `email`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has registered with `email`.
pub fn get_user_by_email(email: &Email, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare(&format!("{SELECT_USER} WHERE email = :email"))?
        .query_row(&[(":email", email.as_ref())], map_user_row)
        .map_err(|error| error.into())
}

/// Replace the password hash of the user registered with `email`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has registered with `email`.
pub fn update_password(
    email: &Email,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE email = ?2",
        (password_hash, email.as_ref()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

#[cfg(test)]
pub(crate) fn create_test_user(email: &str, connection: &Connection) -> User {
    create_user(
        NewUser {
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            email: Email::new(email).unwrap(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        },
        connection,
    )
    .unwrap()
}

#[cfg(test)]
mod user_tests {
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        user::{
            Email, NewUser, UserID, count_users, create_test_user, create_user, get_user_by_email,
            get_user_by_id, update_password,
        },
    };

    use super::{Error, create_user_table};

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Mickey".to_owned(),
            last_name: "Mouse".to_owned(),
            email: Email::new(email).unwrap(),
            password_hash: PasswordHash::new_unchecked("hunter2"),
        }
    }

    #[test]
    fn insert_user_succeeds() {
        let db_connection = get_db_connection();

        let inserted_user = create_user(new_user("mickey@example.com"), &db_connection).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.email.as_ref(), "mickey@example.com");
        assert_eq!(
            inserted_user.password_hash,
            PasswordHash::new_unchecked("hunter2")
        );
    }

    #[test]
    fn insert_user_fails_with_duplicate_email() {
        let db_connection = get_db_connection();
        create_user(new_user("mickey@example.com"), &db_connection).unwrap();

        let result = create_user(new_user("Mickey@Example.com"), &db_connection);

        assert_eq!(result, Err(Error::DuplicateEmail));
    }

    #[test]
    fn email_is_normalised() {
        let email = Email::new("  Minnie@Example.COM ").unwrap();

        assert_eq!(email.as_ref(), "minnie@example.com");
    }

    #[test]
    fn invalid_email_is_rejected() {
        assert!(matches!(
            Email::new("not an email"),
            Err(Error::InvalidEmail(_))
        ));
    }

    #[test]
    fn get_user_fails_with_non_existent_id() {
        let db_connection = get_db_connection();

        let id = UserID::new(42);

        assert_eq!(get_user_by_id(id, &db_connection), Err(Error::NotFound));
    }

    #[test]
    fn get_user_succeeds_with_existing_id() {
        let db_connection = get_db_connection();
        let test_user = create_test_user("test@example.com", &db_connection);

        let retrieved_user = get_user_by_id(test_user.id, &db_connection).unwrap();

        assert_eq!(retrieved_user.id, test_user.id);
        assert_eq!(retrieved_user.email, test_user.email);
    }

    #[test]
    fn get_user_by_email_succeeds() {
        let db_connection = get_db_connection();
        let test_user = create_test_user("test@example.com", &db_connection);

        let retrieved_user =
            get_user_by_email(&Email::new("TEST@example.com").unwrap(), &db_connection).unwrap();

        assert_eq!(retrieved_user.id, test_user.id);
    }

    #[test]
    fn update_password_replaces_hash() {
        let db_connection = get_db_connection();
        let test_user = create_test_user("test@example.com", &db_connection);
        let new_hash = PasswordHash::new_unchecked("hunter3");

        update_password(&test_user.email, &new_hash, &db_connection).unwrap();

        let retrieved_user = get_user_by_id(test_user.id, &db_connection).unwrap();
        assert_eq!(retrieved_user.password_hash, new_hash);
    }

    #[test]
    fn update_password_fails_for_unknown_email() {
        let db_connection = get_db_connection();

        let result = update_password(
            &Email::new("nobody@example.com").unwrap(),
            &PasswordHash::new_unchecked("hunter3"),
            &db_connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn returns_correct_count() {
        let db_connection = get_db_connection();

        let count = count_users(&db_connection).expect("Could not get user count");
        assert_eq!(0, count, "Want zero users before insertion, got {count}");

        create_test_user("test@example.com", &db_connection);

        let count = count_users(&db_connection).expect("Could not get user count");
        assert_eq!(1, count, "Want one user after insertion, got {count}");
    }
}
