//! Defines the wallet model and its database queries.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    color::Color,
    error::{is_foreign_key_violation, is_unique_violation},
    money::Money,
    ownership::{Owned, delete_owned, get_all_owned, get_owned},
    validation::bounded_text,
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a wallet.
pub type WalletId = i64;

/// A validated wallet name between 3 and 80 characters long.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WalletName(String);

impl WalletName {
    /// The number of characters allowed in a wallet name.
    pub const LENGTH: (usize, usize) = (3, 80);

    /// Create a wallet name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidLength] if the trimmed name is too short or too long.
    pub fn new(name: &str) -> Result<Self, Error> {
        bounded_text("Wallet name", name, Self::LENGTH.0, Self::LENGTH.1).map(Self)
    }

    /// Create a wallet name without validation.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for WalletName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for WalletName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named account holding money, e.g. "Cash" or "Credit Card".
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    /// The ID of the wallet.
    pub id: WalletId,
    /// The user's name for the wallet, unique per user.
    pub name: WalletName,
    /// The current balance.
    ///
    /// Equal to `initial_balance` plus the signed amounts of every transaction
    /// assigned to the wallet.
    pub balance: Money,
    /// The balance the wallet was opened with.
    pub initial_balance: Money,
    /// The colour used to display the wallet.
    pub color: Color,
    /// Inactive wallets keep their history but cannot be chosen for new
    /// transactions or budgets.
    pub is_active: bool,
    /// When the wallet was created.
    pub created_at: OffsetDateTime,
}

impl Owned for Wallet {
    const TABLE: &'static str = "wallet";
    const COLUMNS: &'static str =
        "id, name, balance, initial_balance, color, is_active, created_at";

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        let raw_name: String = row.get(1)?;

        Ok(Self {
            id: row.get(0)?,
            name: WalletName::new_unchecked(&raw_name),
            balance: row.get(2)?,
            initial_balance: row.get(3)?,
            color: row.get(4)?,
            is_active: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

/// The user editable fields of a wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWallet {
    /// The name of the wallet.
    pub name: WalletName,
    /// The balance to open the wallet with.
    pub initial_balance: Money,
    /// The colour used to display the wallet.
    pub color: Color,
    /// Whether the wallet can be used for new transactions.
    pub is_active: bool,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the wallet table.
pub fn create_wallet_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS wallet (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE,
            balance TEXT NOT NULL,
            initial_balance TEXT NOT NULL,
            color TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE(user_id, name),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_wallet_user_id ON wallet(user_id);",
    )?;

    Ok(())
}

/// Create a wallet for `user_id` whose balance starts at its initial balance.
///
/// # Errors
///
/// Returns [Error::DuplicateWalletName] if the user already has a wallet with the same name.
pub fn create_wallet(
    wallet: NewWallet,
    user_id: UserID,
    connection: &Connection,
) -> Result<Wallet, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection
        .execute(
            "INSERT INTO wallet (name, balance, initial_balance, color, is_active, user_id, created_at)
            VALUES (?1, ?2, ?2, ?3, ?4, ?5, ?6)",
            (
                wallet.name.as_ref(),
                wallet.initial_balance,
                wallet.color,
                wallet.is_active,
                user_id.as_i64(),
                created_at,
            ),
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                Error::DuplicateWalletName(wallet.name.to_string())
            } else {
                error.into()
            }
        })?;

    Ok(Wallet {
        id: connection.last_insert_rowid(),
        name: wallet.name,
        balance: wallet.initial_balance,
        initial_balance: wallet.initial_balance,
        color: wallet.color,
        is_active: wallet.is_active,
        created_at,
    })
}

/// Get one of the user's wallets.
///
/// # Errors
///
/// Returns [Error::NotFound] if the wallet does not exist or belongs to another user.
pub fn get_wallet(
    wallet_id: WalletId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Wallet, Error> {
    get_owned(wallet_id, user_id, connection)
}

/// Get all of the user's wallets, active wallets first and then by name.
pub fn get_wallets(user_id: UserID, connection: &Connection) -> Result<Vec<Wallet>, Error> {
    get_all_owned(user_id, "is_active DESC, name ASC", connection)
}

/// Get the user's active wallets ordered by name.
pub fn get_active_wallets(user_id: UserID, connection: &Connection) -> Result<Vec<Wallet>, Error> {
    Ok(get_wallets(user_id, connection)?
        .into_iter()
        .filter(|wallet| wallet.is_active)
        .collect())
}

/// Update the user editable fields of a wallet.
///
/// Changing the initial balance shifts the current balance by the same
/// amount within the same SQL transaction.
///
/// # Errors
///
/// Returns [Error::NotFound] if the wallet does not belong to `user_id` and
/// [Error::DuplicateWalletName] if the new name is taken.
pub fn update_wallet(
    wallet_id: WalletId,
    update: NewWallet,
    user_id: UserID,
    connection: &mut Connection,
) -> Result<Wallet, Error> {
    let transaction = connection.transaction()?;
    let current: Wallet = get_owned(wallet_id, user_id, &transaction)?;

    let balance = current.balance + (update.initial_balance - current.initial_balance);

    transaction
        .execute(
            "UPDATE wallet
            SET name = ?1, balance = ?2, initial_balance = ?3, color = ?4, is_active = ?5
            WHERE id = ?6 AND user_id = ?7",
            (
                update.name.as_ref(),
                balance,
                update.initial_balance,
                update.color,
                update.is_active,
                wallet_id,
                user_id.as_i64(),
            ),
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                Error::DuplicateWalletName(update.name.to_string())
            } else {
                error.into()
            }
        })?;

    transaction.commit()?;

    Ok(Wallet {
        id: wallet_id,
        name: update.name,
        balance,
        initial_balance: update.initial_balance,
        color: update.color,
        is_active: update.is_active,
        created_at: current.created_at,
    })
}

/// Whether any transaction or budget refers to the wallet.
fn is_wallet_in_use(wallet_id: WalletId, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM \"transaction\" WHERE wallet_id = ?1)
                OR EXISTS(SELECT 1 FROM budget WHERE wallet_id = ?1)",
            (wallet_id,),
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Delete one of the user's wallets.
///
/// # Errors
///
/// Returns [Error::NotFound] if the wallet does not belong to `user_id` and
/// [Error::WalletInUse] if transactions or budgets still refer to it.
pub fn delete_wallet(
    wallet_id: WalletId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    get_wallet(wallet_id, user_id, connection)?;

    if is_wallet_in_use(wallet_id, connection)? {
        return Err(Error::WalletInUse);
    }

    delete_owned::<Wallet>(wallet_id, user_id, connection).map_err(|error| match error {
        Error::SqlError(ref sql_error) if is_foreign_key_violation(sql_error) => {
            Error::WalletInUse
        }
        error => error,
    })
}

/// The sum of the balances of the user's active wallets.
pub fn get_total_active_balance(user_id: UserID, connection: &Connection) -> Result<Money, Error> {
    Ok(get_active_wallets(user_id, connection)?
        .iter()
        .map(|wallet| wallet.balance)
        .sum())
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod wallet_query_tests {
    use rusqlite::Connection;
    use rust_decimal_macros::dec;

    use crate::{
        Error,
        color::Color,
        db::initialize,
        money::Money,
        user::create_test_user,
        wallet::{
            NewWallet, WalletName, create_wallet, delete_wallet, get_active_wallets,
            get_total_active_balance, get_wallet, get_wallets, update_wallet,
        },
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn new_wallet(name: &str, initial_balance: Money, is_active: bool) -> NewWallet {
        NewWallet {
            name: WalletName::new_unchecked(name),
            initial_balance,
            color: Color::Blue,
            is_active,
        }
    }

    #[test]
    fn create_wallet_starts_at_initial_balance() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);

        let wallet = create_wallet(
            new_wallet("Cash", Money::new(dec!(500)), true),
            user.id,
            &connection,
        )
        .unwrap();

        assert!(wallet.id > 0);
        assert_eq!(wallet.balance, Money::new(dec!(500)));
        assert_eq!(get_wallet(wallet.id, user.id, &connection), Ok(wallet));
    }

    #[test]
    fn create_wallet_fails_on_duplicate_name_for_same_user() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        create_wallet(new_wallet("Cash", Money::ZERO, true), user.id, &connection).unwrap();

        let result = create_wallet(new_wallet("cash", Money::ZERO, true), user.id, &connection);

        assert_eq!(result, Err(Error::DuplicateWalletName("cash".to_owned())));
    }

    #[test]
    fn different_users_can_use_the_same_name() {
        let connection = get_test_connection();
        let mickey = create_test_user("mickey@example.com", &connection);
        let minnie = create_test_user("minnie@example.com", &connection);
        create_wallet(new_wallet("Cash", Money::ZERO, true), mickey.id, &connection).unwrap();

        let result = create_wallet(new_wallet("Cash", Money::ZERO, true), minnie.id, &connection);

        assert!(result.is_ok());
    }

    #[test]
    fn get_wallet_hides_other_users_wallets() {
        let connection = get_test_connection();
        let mickey = create_test_user("mickey@example.com", &connection);
        let minnie = create_test_user("minnie@example.com", &connection);
        let wallet =
            create_wallet(new_wallet("Cash", Money::ZERO, true), mickey.id, &connection).unwrap();

        assert_eq!(
            get_wallet(wallet.id, minnie.id, &connection),
            Err(Error::NotFound)
        );
        assert!(get_wallets(minnie.id, &connection).unwrap().is_empty());
    }

    #[test]
    fn active_wallets_exclude_inactive() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        create_wallet(new_wallet("Cash", Money::ZERO, true), user.id, &connection).unwrap();
        create_wallet(new_wallet("Old Card", Money::ZERO, false), user.id, &connection).unwrap();

        let active = get_active_wallets(user.id, &connection).unwrap();

        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name.as_ref(), "Cash");
    }

    #[test]
    fn update_initial_balance_shifts_balance() {
        let mut connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let wallet = create_wallet(
            new_wallet("Cash", Money::new(dec!(500)), true),
            user.id,
            &connection,
        )
        .unwrap();
        connection
            .execute(
                "UPDATE wallet SET balance = '450.00' WHERE id = ?1",
                (wallet.id,),
            )
            .unwrap();

        let updated = update_wallet(
            wallet.id,
            new_wallet("Pocket Cash", Money::new(dec!(600)), false),
            user.id,
            &mut connection,
        )
        .unwrap();

        assert_eq!(updated.balance, Money::new(dec!(550)));
        assert_eq!(updated.initial_balance, Money::new(dec!(600)));
        assert_eq!(get_wallet(wallet.id, user.id, &connection), Ok(updated));
    }

    #[test]
    fn update_other_users_wallet_is_not_found() {
        let mut connection = get_test_connection();
        let mickey = create_test_user("mickey@example.com", &connection);
        let minnie = create_test_user("minnie@example.com", &connection);
        let wallet =
            create_wallet(new_wallet("Cash", Money::ZERO, true), mickey.id, &connection).unwrap();

        let result = update_wallet(
            wallet.id,
            new_wallet("Mine now", Money::ZERO, true),
            minnie.id,
            &mut connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_wallet_succeeds() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        let wallet =
            create_wallet(new_wallet("Cash", Money::ZERO, true), user.id, &connection).unwrap();

        delete_wallet(wallet.id, user.id, &connection).unwrap();

        assert_eq!(
            get_wallet(wallet.id, user.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_other_users_wallet_is_not_found() {
        let connection = get_test_connection();
        let mickey = create_test_user("mickey@example.com", &connection);
        let minnie = create_test_user("minnie@example.com", &connection);
        let wallet =
            create_wallet(new_wallet("Cash", Money::ZERO, true), mickey.id, &connection).unwrap();

        assert_eq!(
            delete_wallet(wallet.id, minnie.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn total_balance_sums_active_wallets() {
        let connection = get_test_connection();
        let user = create_test_user("test@example.com", &connection);
        create_wallet(
            new_wallet("Checking", Money::new(dec!(2500)), true),
            user.id,
            &connection,
        )
        .unwrap();
        create_wallet(
            new_wallet("Credit Card", Money::new(dec!(-450)), true),
            user.id,
            &connection,
        )
        .unwrap();
        create_wallet(
            new_wallet("Closed", Money::new(dec!(1000)), false),
            user.id,
            &connection,
        )
        .unwrap();

        let total = get_total_active_balance(user.id, &connection).unwrap();

        assert_eq!(total, Money::new(dec!(2050)));
    }
}
