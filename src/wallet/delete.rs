//! Wallet deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    alert::Alert,
    wallet::{WalletId, delete_wallet},
};

/// The state needed for deleting a wallet.
#[derive(Debug, Clone)]
pub struct DeleteWalletState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteWalletState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle wallet deletion. Returns a success alert or an error alert.
pub async fn delete_wallet_endpoint(
    Path(wallet_id): Path<WalletId>,
    State(state): State<DeleteWalletState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_wallet(wallet_id, user_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(_) => Alert::SuccessSimple {
            message: "Wallet deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error @ (Error::NotFound | Error::WalletInUse)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting wallet {wallet_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
