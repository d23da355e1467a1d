//! Defines the transaction model and its database queries.
//!
//! Every mutation runs in a single SQL transaction that also updates the
//! balances of the wallets involved, see [crate::reconcile].

use std::{collections::HashMap, fmt::Display};

use rusqlite::{Connection, Row, Transaction as SqlTransaction, params_from_iter};
use time::{Date, OffsetDateTime};

use crate::{
    Error, UserID,
    category::{CategoryId, get_category},
    label::{LabelId, get_label},
    money::Money,
    ownership::{Owned, get_owned},
    reconcile::{WalletEffect, apply_balance_deltas, balance_deltas},
    wallet::{WalletId, get_wallet},
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// An optional note about a transaction, at most 200 characters long.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionDescription(String);

impl TransactionDescription {
    /// The maximum number of characters in a description.
    pub const MAX_LENGTH: usize = 200;

    /// Create a description, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::DescriptionTooLong] if the trimmed text is too long.
    pub fn new(description: &str) -> Result<Self, Error> {
        let trimmed = description.trim();

        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(Error::DescriptionTooLong(Self::MAX_LENGTH));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Create a description without validation.
    pub fn new_unchecked(description: &str) -> Self {
        Self(description.to_owned())
    }

    /// Whether the description is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for TransactionDescription {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for TransactionDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The unsigned amount of money spent or earned.
    pub amount: Money,
    /// A text description of what the transaction was for.
    pub description: TransactionDescription,
    /// When the transaction happened.
    pub date: Date,
    /// Whether money was spent (`true`) or earned (`false`).
    pub is_expense: bool,
    /// The category the transaction belongs to.
    pub category_id: CategoryId,
    /// The wallet whose balance the transaction affects.
    pub wallet_id: WalletId,
    /// The labels attached to the transaction, in ascending order.
    pub label_ids: Vec<LabelId>,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// The balance-relevant state of the transaction.
    pub fn wallet_effect(&self) -> WalletEffect {
        WalletEffect {
            wallet_id: self.wallet_id,
            amount: self.amount,
            is_expense: self.is_expense,
        }
    }

    /// The amount with its sign: negative for expenses.
    pub fn signed_amount(&self) -> Money {
        self.wallet_effect().signed()
    }
}

/// Reads the transaction row. `label_ids` is filled in separately.
impl Owned for Transaction {
    const TABLE: &'static str = "\"transaction\"";
    const COLUMNS: &'static str =
        "id, amount, description, date, is_expense, category_id, wallet_id, created_at";

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        let raw_description: String = row.get(2)?;

        Ok(Self {
            id: row.get(0)?,
            amount: row.get(1)?,
            description: TransactionDescription::new_unchecked(&raw_description),
            date: row.get(3)?,
            is_expense: row.get(4)?,
            category_id: row.get(5)?,
            wallet_id: row.get(6)?,
            label_ids: Vec::new(),
            created_at: row.get(7)?,
        })
    }
}

/// The user editable fields of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub amount: Money,
    pub description: TransactionDescription,
    pub date: Date,
    pub is_expense: bool,
    pub category_id: CategoryId,
    pub wallet_id: WalletId,
    pub label_ids: Vec<LabelId>,
}

impl NewTransaction {
    fn wallet_effect(&self) -> WalletEffect {
        WalletEffect {
            wallet_id: self.wallet_id,
            amount: self.amount,
            is_expense: self.is_expense,
        }
    }

    fn sorted_label_ids(&self) -> Vec<LabelId> {
        let mut label_ids = self.label_ids.clone();
        label_ids.sort_unstable();
        label_ids.dedup();
        label_ids
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table and the table linking transactions to labels.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            amount TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            date TEXT NOT NULL,
            is_expense INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            wallet_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE,
            FOREIGN KEY(wallet_id) REFERENCES wallet(id) ON UPDATE CASCADE,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_transaction_wallet_id ON \"transaction\"(wallet_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_category_id ON \"transaction\"(category_id);

        CREATE TABLE IF NOT EXISTS transaction_label (
            transaction_id INTEGER NOT NULL,
            label_id INTEGER NOT NULL,
            PRIMARY KEY(transaction_id, label_id),
            FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id) ON DELETE CASCADE,
            FOREIGN KEY(label_id) REFERENCES label(id)
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_label_label_id ON transaction_label(label_id);",
    )?;

    Ok(())
}

/// Check that the category, wallet and labels belong to the user.
///
/// The wallet must be active unless it is `current_wallet_id`, the wallet the
/// transaction is already assigned to.
fn check_references(
    transaction: &NewTransaction,
    current_wallet_id: Option<WalletId>,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    get_category(transaction.category_id, user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCategory,
        error => error,
    })?;

    let wallet =
        get_wallet(transaction.wallet_id, user_id, connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidWallet,
            error => error,
        })?;

    if !wallet.is_active && current_wallet_id != Some(wallet.id) {
        return Err(Error::InactiveWallet(wallet.name.to_string()));
    }

    for label_id in &transaction.label_ids {
        get_label(*label_id, user_id, connection).map_err(|error| match error {
            Error::NotFound => Error::InvalidLabel,
            error => error,
        })?;
    }

    Ok(())
}

fn replace_labels(
    transaction_id: TransactionId,
    label_ids: &[LabelId],
    sql_transaction: &SqlTransaction,
) -> Result<(), Error> {
    sql_transaction.execute(
        "DELETE FROM transaction_label WHERE transaction_id = ?1",
        (transaction_id,),
    )?;

    let mut statement = sql_transaction
        .prepare("INSERT INTO transaction_label (transaction_id, label_id) VALUES (?1, ?2)")?;

    for label_id in label_ids {
        statement.execute((transaction_id, label_id))?;
    }

    Ok(())
}

/// Record a transaction and apply its effect to its wallet's balance.
///
/// The row, its labels and the balance change are committed together.
///
/// # Errors
///
/// Returns [Error::InvalidCategory], [Error::InvalidWallet] or
/// [Error::InvalidLabel] if a referenced row does not belong to the user and
/// [Error::InactiveWallet] if the wallet is inactive.
pub fn create_transaction(
    new_transaction: NewTransaction,
    user_id: UserID,
    connection: &mut Connection,
) -> Result<Transaction, Error> {
    let sql_transaction = connection.transaction()?;
    check_references(&new_transaction, None, user_id, &sql_transaction)?;

    let created_at = OffsetDateTime::now_utc();
    sql_transaction.execute(
        "INSERT INTO \"transaction\"
            (amount, description, date, is_expense, category_id, wallet_id, user_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            new_transaction.amount,
            new_transaction.description.as_ref(),
            new_transaction.date,
            new_transaction.is_expense,
            new_transaction.category_id,
            new_transaction.wallet_id,
            user_id.as_i64(),
            created_at,
        ),
    )?;
    let id = sql_transaction.last_insert_rowid();

    let label_ids = new_transaction.sorted_label_ids();
    replace_labels(id, &label_ids, &sql_transaction)?;

    let deltas = balance_deltas(None, Some(new_transaction.wallet_effect()));
    apply_balance_deltas(&deltas, user_id, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(Transaction {
        id,
        amount: new_transaction.amount,
        description: new_transaction.description,
        date: new_transaction.date,
        is_expense: new_transaction.is_expense,
        category_id: new_transaction.category_id,
        wallet_id: new_transaction.wallet_id,
        label_ids,
        created_at,
    })
}

/// Get the label IDs attached to a transaction in ascending order.
fn get_label_ids(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Vec<LabelId>, Error> {
    connection
        .prepare(
            "SELECT label_id FROM transaction_label WHERE transaction_id = ?1 ORDER BY label_id",
        )?
        .query_map((transaction_id,), |row| row.get(0))?
        .map(|maybe_id| maybe_id.map_err(Error::from))
        .collect()
}

/// Get one of the user's transactions with its labels.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not exist or belongs to another user.
pub fn get_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let mut transaction: Transaction = get_owned(transaction_id, user_id, connection)?;
    transaction.label_ids = get_label_ids(transaction_id, connection)?;

    Ok(transaction)
}

/// Narrows a listing of transactions to those that refer to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionFilter {
    /// Every transaction of the user.
    All,
    /// Transactions that affect the balance of a wallet.
    Wallet(WalletId),
    /// Transactions in a category.
    Category(CategoryId),
    /// Transactions that carry a label.
    Label(LabelId),
}

impl TransactionFilter {
    /// The SQL condition for the filter, which refers to the record ID as `?3`.
    fn condition(self) -> &'static str {
        match self {
            Self::All => "",
            Self::Wallet(_) => "AND wallet_id = ?3",
            Self::Category(_) => "AND category_id = ?3",
            Self::Label(_) => {
                "AND id IN (SELECT transaction_id FROM transaction_label WHERE label_id = ?3)"
            }
        }
    }

    fn record_id(self) -> Option<i64> {
        match self {
            Self::All => None,
            Self::Wallet(id) | Self::Category(id) | Self::Label(id) => Some(id),
        }
    }
}

/// Get the user's transactions with their labels, newest first.
///
/// Transactions on the same date are ordered by ID, most recent first. If
/// `limit` is given, at most that many transactions are returned.
pub fn get_transactions(
    user_id: UserID,
    limit: Option<u32>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    get_filtered_transactions(user_id, TransactionFilter::All, limit, connection)
}

/// Get the user's transactions that match `filter`, newest first.
///
/// Filtering by a record of another user gives an empty list.
pub fn get_filtered_transactions(
    user_id: UserID,
    filter: TransactionFilter,
    limit: Option<u32>,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut params = vec![user_id.as_i64(), limit.map_or(-1, i64::from)];
    params.extend(filter.record_id());

    let mut transactions = connection
        .prepare(&format!(
            "SELECT {} FROM {} WHERE user_id = ?1 {} ORDER BY date DESC, id DESC LIMIT ?2",
            Transaction::COLUMNS,
            Transaction::TABLE,
            filter.condition(),
        ))?
        .query_map(params_from_iter(params), Transaction::map_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect::<Result<Vec<_>, _>>()?;

    let mut labels_by_transaction: HashMap<TransactionId, Vec<LabelId>> = HashMap::new();
    let links = connection
        .prepare(
            "SELECT transaction_label.transaction_id, transaction_label.label_id
            FROM transaction_label
            INNER JOIN \"transaction\" ON \"transaction\".id = transaction_label.transaction_id
            WHERE \"transaction\".user_id = ?1
            ORDER BY transaction_label.label_id",
        )?
        .query_map((user_id.as_i64(),), |row| {
            Ok((row.get::<_, TransactionId>(0)?, row.get::<_, LabelId>(1)?))
        })?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    for (transaction_id, label_id) in links {
        labels_by_transaction
            .entry(transaction_id)
            .or_default()
            .push(label_id);
    }

    for transaction in &mut transactions {
        if let Some(label_ids) = labels_by_transaction.remove(&transaction.id) {
            transaction.label_ids = label_ids;
        }
    }

    Ok(transactions)
}

/// Update one of the user's transactions and reconcile the wallet balances.
///
/// The stored state is read before any change so that the old effect can be
/// undone on the old wallet and the new effect applied to the new wallet.
/// The transaction may stay on its current wallet even if that wallet has
/// since been deactivated. The label set is replaced.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not belong to `user_id`,
/// plus the errors of [create_transaction].
pub fn update_transaction(
    transaction_id: TransactionId,
    update: NewTransaction,
    user_id: UserID,
    connection: &mut Connection,
) -> Result<Transaction, Error> {
    let sql_transaction = connection.transaction()?;

    let before: Transaction = get_owned(transaction_id, user_id, &sql_transaction)?;
    let before_effect = before.wallet_effect();
    check_references(&update, Some(before.wallet_id), user_id, &sql_transaction)?;

    sql_transaction.execute(
        "UPDATE \"transaction\"
        SET amount = ?1, description = ?2, date = ?3, is_expense = ?4, category_id = ?5,
            wallet_id = ?6
        WHERE id = ?7 AND user_id = ?8",
        (
            update.amount,
            update.description.as_ref(),
            update.date,
            update.is_expense,
            update.category_id,
            update.wallet_id,
            transaction_id,
            user_id.as_i64(),
        ),
    )?;

    let label_ids = update.sorted_label_ids();
    replace_labels(transaction_id, &label_ids, &sql_transaction)?;

    let deltas = balance_deltas(Some(before_effect), Some(update.wallet_effect()));
    apply_balance_deltas(&deltas, user_id, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(Transaction {
        id: transaction_id,
        amount: update.amount,
        description: update.description,
        date: update.date,
        is_expense: update.is_expense,
        category_id: update.category_id,
        wallet_id: update.wallet_id,
        label_ids,
        created_at: before.created_at,
    })
}

/// Delete one of the user's transactions and undo its effect on its wallet.
///
/// # Errors
///
/// Returns [Error::NotFound] if the transaction does not belong to `user_id`.
pub fn delete_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &mut Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.transaction()?;

    let before: Transaction = get_owned(transaction_id, user_id, &sql_transaction)?;

    sql_transaction.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id.as_i64()),
    )?;

    let deltas = balance_deltas(Some(before.wallet_effect()), None);
    apply_balance_deltas(&deltas, user_id, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
pub(crate) mod test_fixture {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::{Date, macros::date};

    use crate::{
        UserID,
        category::{Category, CategoryIcon, CategoryName, NewCategory, create_category},
        color::Color,
        db::initialize,
        label::{Label, LabelName, create_label},
        money::Money,
        transaction::{NewTransaction, TransactionDescription},
        user::create_test_user,
        wallet::{NewWallet, Wallet, WalletName, create_wallet},
    };

    /// A user with one category, one label and two wallets.
    pub(crate) struct Fixture {
        pub connection: Connection,
        pub user_id: UserID,
        pub category: Category,
        pub label: Label,
        pub wallet_a: Wallet,
        pub wallet_b: Wallet,
    }

    pub(crate) const TEST_DATE: Date = date!(2025 - 03 - 14);

    pub(crate) fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("test@example.com", &connection);
        let category = create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Groceries"),
                color: Color::Green,
                icon: CategoryIcon::ShoppingCart,
            },
            user.id,
            &connection,
        )
        .unwrap();
        let label = create_label(LabelName::new_unchecked("Weekly"), user.id, &connection).unwrap();
        let new_wallet = |name: &str| {
            create_wallet(
                NewWallet {
                    name: WalletName::new_unchecked(name),
                    initial_balance: Money::new(Decimal::from(1000)),
                    color: Color::Blue,
                    is_active: true,
                },
                user.id,
                &connection,
            )
            .unwrap()
        };
        let wallet_a = new_wallet("Wallet A");
        let wallet_b = new_wallet("Wallet B");

        Fixture {
            connection,
            user_id: user.id,
            category,
            label,
            wallet_a,
            wallet_b,
        }
    }

    impl Fixture {
        pub(crate) fn new_transaction(
            &self,
            amount: Decimal,
            is_expense: bool,
            wallet: &Wallet,
        ) -> NewTransaction {
            NewTransaction {
                amount: Money::new(amount),
                description: TransactionDescription::new_unchecked("test"),
                date: TEST_DATE,
                is_expense,
                category_id: self.category.id,
                wallet_id: wallet.id,
                label_ids: vec![],
            }
        }

        pub(crate) fn balance(&self, wallet: &Wallet) -> Money {
            crate::wallet::get_wallet(wallet.id, self.user_id, &self.connection)
                .unwrap()
                .balance
        }
    }
}
