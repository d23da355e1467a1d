//! Transactions: money spent from or earned into a wallet.
//!
//! Creating, editing and deleting a transaction keeps its wallet's balance in
//! step, see [crate::reconcile].

pub(crate) mod core;
mod create;
mod delete;
mod edit;
pub(crate) mod form;
mod list;

pub use core::{
    NewTransaction, Transaction, TransactionDescription, TransactionId, create_transaction,
    TransactionFilter, create_transaction_table, delete_transaction, get_filtered_transactions,
    get_transaction, get_transactions, update_transaction,
};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use list::{TransactionListItem, get_transactions_page, resolve_references, transactions_table};
