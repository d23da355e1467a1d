//! Wallet editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::Markup;
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID, endpoints,
    html::{FormEndpoint, form_page},
    navigation::NavBar,
    wallet::{
        WalletId,
        form::{WalletForm, wallet_form_view},
        get_wallet, update_wallet,
    },
};

/// The state needed for the edit wallet page and endpoint.
#[derive(Debug, Clone)]
pub struct EditWalletState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditWalletState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the wallet editing page.
pub async fn get_edit_wallet_page(
    Path(wallet_id): Path<WalletId>,
    State(state): State<EditWalletState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let wallet = get_wallet(wallet_id, user_id, &connection)?;
    let nav_bar = NavBar::new(&endpoints::format_endpoint(
        endpoints::EDIT_WALLET_VIEW,
        wallet_id,
    ))
    .into_html();

    Ok(form_page(
        "Edit Wallet",
        nav_bar,
        edit_wallet_form_view(wallet_id, &WalletForm::from(&wallet), ""),
    )
    .into_response())
}

/// Handle wallet update form submission.
pub async fn update_wallet_endpoint(
    Path(wallet_id): Path<WalletId>,
    State(state): State<EditWalletState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<WalletForm>,
) -> Response {
    let update = match form.validate() {
        Ok(update) => update,
        Err(error) => {
            return edit_wallet_form_view(wallet_id, &form, &format!("Error: {error}"))
                .into_response();
        }
    };

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_wallet(wallet_id, update, user_id, &mut connection) {
        Ok(_) => (
            HxRedirect(endpoints::WALLETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DuplicateWalletName(_)) => {
            edit_wallet_form_view(wallet_id, &form, &format!("Error: {error}")).into_response()
        }
        Err(Error::NotFound) => Error::NotFound.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating wallet {wallet_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_wallet_form_view(wallet_id: WalletId, values: &WalletForm, error_message: &str) -> Markup {
    let update_endpoint = endpoints::format_endpoint(endpoints::WALLET, wallet_id);

    wallet_form_view(FormEndpoint::Put(&update_endpoint), values, error_message)
}
