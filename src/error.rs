//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use time::Date;

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an email and password combination that does not match a user.
    #[error("Incorrect email or password.")]
    InvalidCredentials,

    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The auth token in the cookie has expired.
    #[error("the auth token has expired")]
    TokenExpired,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The password and its confirmation differ.
    #[error("Passwords do not match")]
    PasswordsDoNotMatch,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// Another user has already registered with the email address.
    #[error("That email is taken. Please choose a different one.")]
    DuplicateEmail,

    /// A name or other text field is shorter or longer than allowed.
    #[error("{field} must be between {min} and {max} characters")]
    InvalidLength {
        /// The human readable name of the field, e.g. "Wallet name".
        field: &'static str,
        /// The minimum number of characters.
        min: usize,
        /// The maximum number of characters.
        max: usize,
    },

    /// The description of a transaction is too long.
    #[error("Description must be {0} characters or less")]
    DescriptionTooLong(usize),

    /// The user already has a wallet with the given name.
    #[error("You already have a wallet named '{0}'")]
    DuplicateWalletName(String),

    /// The user already has a category with the given name.
    #[error("You already have a category named '{0}'")]
    DuplicateCategoryName(String),

    /// The user already has a label with the given name.
    #[error("You already have a label named '{0}'")]
    DuplicateLabelName(String),

    /// The user already has a budget for the category, wallet and month.
    #[error("You already have a budget for this category and period in this wallet")]
    DuplicateBudget,

    /// A transaction or budget amount is outside of the allowed range.
    #[error("Amount must be between 0.01 and 99,999,999.99")]
    AmountOutOfRange,

    /// A wallet balance is outside of the allowed range.
    #[error("Balance must be between -99,999,999.99 and 99,999,999.99")]
    BalanceOutOfRange,

    /// A monetary value has fractions of a cent.
    #[error("Amounts cannot have more than two decimal places")]
    TooManyDecimalPlaces,

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The month number is not between 1 and 12.
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u8),

    /// The budget year is too far from the current year.
    #[error("Year must be between {min} and {max}")]
    YearOutOfRange {
        /// The earliest allowed year.
        min: i32,
        /// The latest allowed year.
        max: i32,
    },

    /// The category ID does not refer to one of the user's categories.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory,

    /// The wallet ID does not refer to one of the user's wallets.
    #[error("the wallet ID does not refer to a valid wallet")]
    InvalidWallet,

    /// A label ID does not refer to one of the user's labels.
    #[error("a label ID does not refer to a valid label")]
    InvalidLabel,

    /// The wallet has been deactivated and cannot be used for new records.
    #[error("the wallet \"{0}\" is not active")]
    InactiveWallet(String),

    /// The wallet is referenced by transactions or budgets.
    #[error("Cannot delete a wallet with existing transactions or budgets")]
    WalletInUse,

    /// The category is referenced by transactions or budgets.
    #[error("Cannot delete a category with existing transactions or budgets")]
    CategoryInUse,

    /// The label is attached to transactions.
    #[error("Cannot delete a label with existing transactions")]
    LabelInUse,

    /// The requested resource was not found.
    ///
    /// Rows owned by another user are reported with this error too, so that
    /// clients cannot tell whether an ID exists.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// A value read from the database could not be parsed.
    #[error("could not parse the stored value \"{0}\"")]
    CorruptValue(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
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

/// Returns `true` if `error` is a failed UNIQUE constraint.
pub(crate) fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(sql_error, _)
            if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Returns `true` if `error` is a failed FOREIGN KEY constraint.
pub(crate) fn is_foreign_key_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(sql_error, _)
            if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The item could not be found or you do not have access to it. \
                    Try refreshing the page to see if it has already been deleted."
                        .to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            Error::WalletInUse => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Could not delete wallet".to_owned(),
                    details: Error::WalletInUse.to_string(),
                },
            ),
            Error::CategoryInUse => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Could not delete category".to_owned(),
                    details: Error::CategoryInUse.to_string(),
                },
            ),
            Error::LabelInUse => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Could not delete label".to_owned(),
                    details: Error::LabelInUse.to_string(),
                },
            ),
            error @ (Error::InvalidCategory | Error::InvalidWallet | Error::InvalidLabel) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid selection".to_owned(),
                    details: format!("Sorry, {error}. Refresh the page and try again."),
                },
            ),
            error @ (Error::InvalidLength { .. }
            | Error::DescriptionTooLong(_)
            | Error::DuplicateWalletName(_)
            | Error::DuplicateCategoryName(_)
            | Error::DuplicateLabelName(_)
            | Error::DuplicateBudget
            | Error::AmountOutOfRange
            | Error::BalanceOutOfRange
            | Error::TooManyDecimalPlaces
            | Error::FutureDate(_)
            | Error::InvalidMonth(_)
            | Error::YearOutOfRange { .. }
            | Error::InactiveWallet(_)) => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: error.to_string(),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::{Error, is_foreign_key_violation, is_unique_violation};

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn detects_unique_violation() {
        let connection = rusqlite::Connection::open_in_memory().unwrap();
        connection
            .execute("CREATE TABLE t (name TEXT UNIQUE)", ())
            .unwrap();
        connection
            .execute("INSERT INTO t (name) VALUES ('a')", ())
            .unwrap();

        let error = connection
            .execute("INSERT INTO t (name) VALUES ('a')", ())
            .unwrap_err();

        assert!(is_unique_violation(&error));
        assert!(!is_foreign_key_violation(&error));
    }

    #[test]
    fn in_use_alerts_are_conflicts() {
        let response = Error::WalletInUse.into_alert_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn not_found_page_is_404() {
        let response = Error::NotFound.into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
