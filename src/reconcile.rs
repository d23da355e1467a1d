//! Keeps wallet balances in step with the transactions assigned to them.
//!
//! A wallet's balance always equals its initial balance plus the signed
//! effect of every transaction currently pointing at it. Mutations describe
//! the balance-relevant state of a transaction before and after the change,
//! [balance_deltas] turns that into per-wallet deltas and
//! [apply_balance_deltas] writes them in the caller's SQL transaction.

use rusqlite::Transaction as SqlTransaction;

use crate::{Error, UserID, money::Money, wallet::WalletId};

/// The amount a transaction adds to its wallet: negative for expenses.
pub fn signed_effect(amount: Money, is_expense: bool) -> Money {
    if is_expense { -amount } else { amount }
}

/// The parts of a transaction that affect a wallet balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalletEffect {
    /// The wallet the transaction is assigned to.
    pub wallet_id: WalletId,
    /// The unsigned amount of the transaction.
    pub amount: Money,
    /// Whether the transaction is money going out.
    pub is_expense: bool,
}

impl WalletEffect {
    /// The signed change this transaction makes to its wallet balance.
    pub fn signed(&self) -> Money {
        signed_effect(self.amount, self.is_expense)
    }
}

/// A change to apply to a single wallet's balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceDelta {
    /// The wallet to change.
    pub wallet_id: WalletId,
    /// The amount to add to the balance.
    pub delta: Money,
}

/// Compute the balance changes for a transaction going from `before` to `after`.
///
/// Creating a transaction is `(None, Some(new))`, deleting is
/// `(Some(old), None)` and updating is `(Some(old), Some(new))`. `before`
/// must be captured from the stored row before it is modified.
///
/// The old effect is undone on the old wallet and the new effect is applied
/// to the new wallet. When both are the same wallet the two are merged into
/// a single net delta. Zero deltas are left out.
pub fn balance_deltas(
    before: Option<WalletEffect>,
    after: Option<WalletEffect>,
) -> Vec<BalanceDelta> {
    let mut deltas: Vec<BalanceDelta> = Vec::with_capacity(2);

    let changes = before
        .map(|effect| (effect.wallet_id, -effect.signed()))
        .into_iter()
        .chain(after.map(|effect| (effect.wallet_id, effect.signed())));

    for (wallet_id, delta) in changes {
        match deltas.iter_mut().find(|existing| existing.wallet_id == wallet_id) {
            Some(existing) => existing.delta += delta,
            None => deltas.push(BalanceDelta { wallet_id, delta }),
        }
    }

    deltas.retain(|delta| !delta.delta.is_zero());
    deltas
}

/// Add each delta to its wallet's balance inside `transaction`.
///
/// Balances are read and written within the caller's SQL transaction, so
/// the update commits or rolls back together with the transaction row.
///
/// # Errors
///
/// Returns [Error::NotFound] if a wallet does not exist or does not belong to
/// `user_id`. The caller should drop `transaction` without committing.
pub fn apply_balance_deltas(
    deltas: &[BalanceDelta],
    user_id: UserID,
    transaction: &SqlTransaction,
) -> Result<(), Error> {
    for BalanceDelta { wallet_id, delta } in deltas {
        let balance: Money = transaction.query_row(
            "SELECT balance FROM wallet WHERE id = ?1 AND user_id = ?2",
            (wallet_id, user_id.as_i64()),
            |row| row.get(0),
        )?;

        transaction.execute(
            "UPDATE wallet SET balance = ?1 WHERE id = ?2 AND user_id = ?3",
            (balance + *delta, wallet_id, user_id.as_i64()),
        )?;

        tracing::debug!("changed balance of wallet {wallet_id} by {delta}");
    }

    Ok(())
}
