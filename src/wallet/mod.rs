//! Wallets: named accounts whose balances follow their transactions.

mod core;
mod create;
mod delete;
mod detail;
mod edit;
pub(crate) mod form;
mod list;

pub use core::{
    NewWallet, Wallet, WalletId, WalletName, create_wallet, create_wallet_table, delete_wallet,
    get_active_wallets, get_total_active_balance, get_wallet, get_wallets, update_wallet,
};
pub use create::{create_wallet_endpoint, get_new_wallet_page};
pub use delete::delete_wallet_endpoint;
pub use detail::get_wallet_page;
pub use edit::{get_edit_wallet_page, update_wallet_endpoint};
pub use list::get_wallets_page;
