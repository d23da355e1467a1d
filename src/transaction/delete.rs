//! Transaction deletion endpoint.

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
    transaction::{TransactionId, delete_transaction},
};

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle transaction deletion, undoing its effect on its wallet's balance.
pub async fn delete_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, user_id, &mut connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(_) => Alert::SuccessSimple {
            message: "Transaction deleted successfully".to_owned(),
        }
        .into_response(),
        Err(Error::NotFound) => Error::NotFound.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rust_decimal_macros::dec;

    use crate::{
        money::Money,
        transaction::{core::test_fixture::get_fixture, create_transaction, get_transactions},
        user::create_test_user,
        wallet::get_wallet,
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    #[tokio::test]
    async fn deleting_income_removes_it_from_balance() {
        let mut fixture = get_fixture();
        let new = fixture.new_transaction(dec!(250), false, &fixture.wallet_a);
        let transaction = create_transaction(new, fixture.user_id, &mut fixture.connection).unwrap();
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(fixture.connection)),
        };

        let response = delete_transaction_endpoint(
            Path(transaction.id),
            State(state.clone()),
            Extension(fixture.user_id),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        let wallet = get_wallet(fixture.wallet_a.id, fixture.user_id, &connection).unwrap();
        assert_eq!(wallet.balance, Money::new(dec!(1000)));
        assert!(
            get_transactions(fixture.user_id, None, &connection)
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn other_users_get_not_found() {
        let mut fixture = get_fixture();
        let new = fixture.new_transaction(dec!(250), true, &fixture.wallet_a);
        let transaction = create_transaction(new, fixture.user_id, &mut fixture.connection).unwrap();
        let other_user = create_test_user("other@example.com", &fixture.connection);
        let state = DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(fixture.connection)),
        };

        let response = delete_transaction_endpoint(
            Path(transaction.id),
            State(state.clone()),
            Extension(other_user.id),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let connection = state.db_connection.lock().unwrap();
        let wallet = get_wallet(fixture.wallet_a.id, fixture.user_id, &connection).unwrap();
        assert_eq!(wallet.balance, Money::new(dec!(750)));
    }
}
