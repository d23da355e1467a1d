//! Defines the budget model and its database queries.

use std::collections::HashMap;

use rusqlite::{Connection, Row, types::Type};
use time::{Date, Month};

use crate::{
    Error, UserID,
    category::{Category, CategoryId, get_categories, get_category},
    error::is_unique_violation,
    money::Money,
    ownership::{Owned, delete_owned, get_all_owned, get_owned},
    transaction::{Transaction, TransactionFilter, get_filtered_transactions},
    wallet::{Wallet, WalletId, get_wallet, get_wallets},
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a budget.
pub type BudgetId = i64;

/// How much a user plans to spend in one category from one wallet over a month.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: BudgetId,
    pub amount: Money,
    pub month: Month,
    pub year: i32,
    pub category_id: CategoryId,
    pub wallet_id: WalletId,
}

impl Owned for Budget {
    const TABLE: &'static str = "budget";
    const COLUMNS: &'static str = "id, amount, month, year, category_id, wallet_id";

    fn map_row(row: &Row) -> Result<Self, rusqlite::Error> {
        let raw_month: u8 = row.get(2)?;
        let month = Month::try_from(raw_month).map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(2, Type::Integer, Box::new(error))
        })?;

        Ok(Self {
            id: row.get(0)?,
            amount: row.get(1)?,
            month,
            year: row.get(3)?,
            category_id: row.get(4)?,
            wallet_id: row.get(5)?,
        })
    }
}

/// The user editable fields of a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub amount: Money,
    pub month: Month,
    pub year: i32,
    pub category_id: CategoryId,
    pub wallet_id: WalletId,
}

/// A budget together with what has been spent against it.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSummary {
    pub budget: Budget,
    pub category: Category,
    pub wallet: Wallet,
    /// The sum of the expenses in the budget's category and wallet during its month.
    pub spent: Money,
}

impl BudgetSummary {
    /// The amount left to spend, negative once the budget is exceeded.
    pub fn remaining(&self) -> Money {
        self.budget.amount - self.spent
    }
}

/// The range of years a budget may be set for, relative to `today`.
pub fn allowed_years(today: Date) -> (i32, i32) {
    (today.year() - 5, today.year() + 5)
}

/// Check that `year` is within five years of `today`.
///
/// # Errors
///
/// Returns [Error::YearOutOfRange] otherwise.
pub fn validate_year(year: i32, today: Date) -> Result<i32, Error> {
    let (min, max) = allowed_years(today);

    if year < min || year > max {
        return Err(Error::YearOutOfRange { min, max });
    }

    Ok(year)
}

/// The first day of the month and the first day of the following month.
fn month_bounds(month: Month, year: i32) -> Result<(Date, Date), Error> {
    let (next_year, next_month) = match month {
        Month::December => (year + 1, Month::January),
        month => (year, month.next()),
    };

    let start = Date::from_calendar_date(year, month, 1)
        .map_err(|error| Error::CorruptValue(error.to_string()))?;
    let end = Date::from_calendar_date(next_year, next_month, 1)
        .map_err(|error| Error::CorruptValue(error.to_string()))?;

    Ok((start, end))
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the budget table.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            amount TEXT NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            year INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            wallet_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            UNIQUE(user_id, category_id, wallet_id, month, year),
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE,
            FOREIGN KEY(wallet_id) REFERENCES wallet(id) ON UPDATE CASCADE,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_budget_user_id ON budget(user_id);",
    )?;

    Ok(())
}

/// Check that the category and wallet belong to the user.
///
/// The wallet must be active unless it is `current_wallet_id`, the wallet the
/// budget already uses.
fn check_references(
    budget: &NewBudget,
    current_wallet_id: Option<WalletId>,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    get_category(budget.category_id, user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidCategory,
        error => error,
    })?;

    let wallet = get_wallet(budget.wallet_id, user_id, connection).map_err(|error| match error {
        Error::NotFound => Error::InvalidWallet,
        error => error,
    })?;

    if !wallet.is_active && current_wallet_id != Some(wallet.id) {
        return Err(Error::InactiveWallet(wallet.name.to_string()));
    }

    Ok(())
}

fn map_duplicate_budget(error: rusqlite::Error) -> Error {
    if is_unique_violation(&error) {
        Error::DuplicateBudget
    } else {
        error.into()
    }
}

/// Create a budget for `user_id`.
///
/// # Errors
///
/// Returns [Error::InvalidCategory] or [Error::InvalidWallet] if the
/// referenced rows do not belong to the user, [Error::InactiveWallet] if the
/// wallet is inactive and [Error::DuplicateBudget] if the user already has a
/// budget for the category, wallet and month.
pub fn create_budget(
    budget: NewBudget,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    check_references(&budget, None, user_id, connection)?;

    connection
        .execute(
            "INSERT INTO budget (amount, month, year, category_id, wallet_id, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                budget.amount,
                u8::from(budget.month),
                budget.year,
                budget.category_id,
                budget.wallet_id,
                user_id.as_i64(),
            ),
        )
        .map_err(map_duplicate_budget)?;

    Ok(Budget {
        id: connection.last_insert_rowid(),
        amount: budget.amount,
        month: budget.month,
        year: budget.year,
        category_id: budget.category_id,
        wallet_id: budget.wallet_id,
    })
}

/// Get one of the user's budgets.
///
/// # Errors
///
/// Returns [Error::NotFound] if the budget does not exist or belongs to another user.
pub fn get_budget(
    budget_id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    get_owned(budget_id, user_id, connection)
}

/// Get all of the user's budgets, most recent period first.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    get_all_owned(user_id, "year DESC, month DESC, id ASC", connection)
}

/// Update one of the user's budgets.
///
/// # Errors
///
/// Returns [Error::NotFound] if the budget does not belong to `user_id`, plus
/// the errors of [create_budget].
pub fn update_budget(
    budget_id: BudgetId,
    update: NewBudget,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    let current = get_budget(budget_id, user_id, connection)?;
    check_references(&update, Some(current.wallet_id), user_id, connection)?;

    connection
        .execute(
            "UPDATE budget
            SET amount = ?1, month = ?2, year = ?3, category_id = ?4, wallet_id = ?5
            WHERE id = ?6 AND user_id = ?7",
            (
                update.amount,
                u8::from(update.month),
                update.year,
                update.category_id,
                update.wallet_id,
                budget_id,
                user_id.as_i64(),
            ),
        )
        .map_err(map_duplicate_budget)?;

    Ok(Budget {
        id: budget_id,
        amount: update.amount,
        month: update.month,
        year: update.year,
        category_id: update.category_id,
        wallet_id: update.wallet_id,
    })
}

/// Delete one of the user's budgets.
///
/// # Errors
///
/// Returns [Error::NotFound] if the budget does not belong to `user_id`.
pub fn delete_budget(
    budget_id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    delete_owned::<Budget>(budget_id, user_id, connection)
}

/// The sum of the user's expenses in a category and wallet during a month.
pub fn get_spent_amount(
    budget: &Budget,
    user_id: UserID,
    connection: &Connection,
) -> Result<Money, Error> {
    let (start, end) = month_bounds(budget.month, budget.year)?;

    connection
        .prepare(
            "SELECT amount FROM \"transaction\"
            WHERE user_id = ?1 AND category_id = ?2 AND wallet_id = ?3
                AND is_expense = 1 AND date >= ?4 AND date < ?5",
        )?
        .query_map(
            (
                user_id.as_i64(),
                budget.category_id,
                budget.wallet_id,
                start,
                end,
            ),
            |row| row.get::<_, Money>(0),
        )?
        .map(|maybe_amount| maybe_amount.map_err(Error::from))
        .sum()
}

/// Get the user's budgets with their categories, wallets and spent amounts.
///
/// If `period` is given, only budgets for that month and year are returned.
pub fn get_budget_summaries(
    user_id: UserID,
    period: Option<(Month, i32)>,
    connection: &Connection,
) -> Result<Vec<BudgetSummary>, Error> {
    let categories: HashMap<CategoryId, Category> = get_categories(user_id, connection)?
        .into_iter()
        .map(|category| (category.id, category))
        .collect();
    let wallets: HashMap<WalletId, Wallet> = get_wallets(user_id, connection)?
        .into_iter()
        .map(|wallet| (wallet.id, wallet))
        .collect();

    get_budgets(user_id, connection)?
        .into_iter()
        .filter(|budget| match period {
            Some((month, year)) => budget.month == month && budget.year == year,
            None => true,
        })
        .map(|budget| {
            let category = categories
                .get(&budget.category_id)
                .cloned()
                .ok_or(Error::InvalidCategory)?;
            let wallet = wallets
                .get(&budget.wallet_id)
                .cloned()
                .ok_or(Error::InvalidWallet)?;
            let spent = get_spent_amount(&budget, user_id, connection)?;

            Ok(BudgetSummary {
                budget,
                category,
                wallet,
                spent,
            })
        })
        .collect()
}

/// Get one of the user's budgets with its category, wallet and spent amount.
///
/// # Errors
///
/// Returns [Error::NotFound] if the budget does not belong to `user_id`.
pub fn get_budget_summary(
    budget_id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<BudgetSummary, Error> {
    let budget = get_budget(budget_id, user_id, connection)?;
    let category = get_category(budget.category_id, user_id, connection)?;
    let wallet = get_wallet(budget.wallet_id, user_id, connection)?;
    let spent = get_spent_amount(&budget, user_id, connection)?;

    Ok(BudgetSummary {
        budget,
        category,
        wallet,
        spent,
    })
}

/// The expenses counted towards `budget`, newest first.
pub fn get_budget_expenses(
    budget: &Budget,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (start, end) = month_bounds(budget.month, budget.year)?;

    Ok(get_filtered_transactions(
        user_id,
        TransactionFilter::Category(budget.category_id),
        None,
        connection,
    )?
    .into_iter()
    .filter(|transaction| {
        transaction.is_expense
            && transaction.wallet_id == budget.wallet_id
            && transaction.date >= start
            && transaction.date < end
    })
    .collect())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod budget_validation_tests {
    use time::macros::date;

    use crate::{
        Error,
        budget::{allowed_years, validate_year},
    };

    #[test]
    fn allows_five_years_either_side() {
        let today = date!(2025 - 06 - 15);

        assert_eq!(allowed_years(today), (2020, 2030));
        assert_eq!(validate_year(2020, today), Ok(2020));
        assert_eq!(validate_year(2030, today), Ok(2030));
    }

    #[test]
    fn rejects_years_outside_range() {
        let today = date!(2025 - 06 - 15);

        assert_eq!(
            validate_year(2019, today),
            Err(Error::YearOutOfRange {
                min: 2020,
                max: 2030
            })
        );
        assert!(validate_year(2031, today).is_err());
    }
}
