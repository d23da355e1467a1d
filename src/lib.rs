//! Billfold is a web app for tracking personal spending across wallets.
//!
//! Each user keeps their own wallets, categories, labels, monthly budgets and
//! transactions. Wallet balances follow every transaction that is created,
//! edited or deleted.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod budget;
mod category;
mod color;
mod dashboard;
mod db;
mod endpoints;
mod error;
mod html;
mod internal_server_error;
mod label;
mod logging;
mod money;
mod navigation;
mod not_found;
mod ownership;
mod password;
mod reconcile;
mod routing;
mod timezone;
mod transaction;
mod user;
mod validation;
mod wallet;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use budget::{Budget, NewBudget, create_budget};
pub use category::{Category, CategoryIcon, CategoryName, NewCategory, create_category};
pub use color::Color;
pub use db::initialize as initialize_db;
pub use error::Error;
pub use label::{Label, LabelName, create_label};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::Money;
pub use password::{PasswordHash, ValidatedPassword};
pub use routing::build_router;
pub use transaction::{NewTransaction, Transaction, TransactionDescription, create_transaction};
pub use user::{
    Email, NewUser, User, UserID, create_user, get_user_by_email, get_user_by_id, update_password,
    validate_first_name, validate_last_name,
};
pub use wallet::{NewWallet, Wallet, WalletName, create_wallet, get_wallet};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}
