//! Wallet creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
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
        create_wallet,
        form::{WalletForm, wallet_form_view},
    },
};

/// The state needed for creating a wallet.
#[derive(Debug, Clone)]
pub struct CreateWalletState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateWalletState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the wallet creation page.
pub async fn get_new_wallet_page() -> Response {
    new_wallet_view().into_response()
}

/// Handle wallet creation form submission.
pub async fn create_wallet_endpoint(
    State(state): State<CreateWalletState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<WalletForm>,
) -> Response {
    let new_wallet = match form.validate() {
        Ok(new_wallet) => new_wallet,
        Err(error) => return new_wallet_form_view(&form, &format!("Error: {error}")).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_wallet(new_wallet, user_id, &connection) {
        Ok(wallet) => {
            tracing::info!("user {user_id} created wallet {}", wallet.id);

            (
                HxRedirect(endpoints::WALLETS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ Error::DuplicateWalletName(_)) => {
            new_wallet_form_view(&form, &format!("Error: {error}")).into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a wallet: {error}");
            error.into_alert_response()
        }
    }
}

fn new_wallet_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_WALLET_VIEW).into_html();

    form_page(
        "New Wallet",
        nav_bar,
        new_wallet_form_view(&WalletForm::default(), ""),
    )
}

fn new_wallet_form_view(values: &WalletForm, error_message: &str) -> Markup {
    wallet_form_view(
        FormEndpoint::Post(endpoints::WALLETS_API),
        values,
        error_message,
    )
}

#[cfg(test)]
mod new_wallet_page_tests {
    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_html_response, assert_hx_endpoint, assert_submit_button,
            assert_valid_html, must_get_form, parse_html_document,
        },
        wallet::get_new_wallet_page,
    };

    #[tokio::test]
    async fn render_page() {
        let response = get_new_wallet_page().await;

        assert_html_response(&response);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::WALLETS_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_submit_button(&form, Some("Create Wallet"));
    }
}

#[cfg(test)]
mod create_wallet_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use rust_decimal_macros::dec;

    use crate::{
        UserID,
        color::Color,
        db::initialize,
        endpoints,
        money::Money,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_fragment,
        },
        user::create_test_user,
        wallet::{create_wallet_endpoint, get_wallets},
    };

    use super::{CreateWalletState, WalletForm};

    fn get_state() -> (CreateWalletState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("test@example.com", &connection);

        (
            CreateWalletState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn can_create_wallet() {
        let (state, user_id) = get_state();
        let form = WalletForm {
            name: "Savings Account".to_owned(),
            initial_balance: Some(dec!(10000)),
            color: Color::Emerald,
            is_active: true,
        };

        let response = create_wallet_endpoint(State(state.clone()), Extension(user_id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::WALLETS_VIEW);
        let wallets = get_wallets(user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(wallets.len(), 1);
        assert_eq!(wallets[0].name.as_ref(), "Savings Account");
        assert_eq!(wallets[0].balance, Money::new(dec!(10000)));
        assert_eq!(wallets[0].color, Color::Emerald);
    }

    #[tokio::test]
    async fn create_wallet_fails_on_short_name() {
        let (state, user_id) = get_state();
        let form = WalletForm {
            name: "ab".to_owned(),
            ..Default::default()
        };

        let response = create_wallet_endpoint(State(state), Extension(user_id), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "Error: Wallet name must be between 3 and 80 characters",
        );
    }

    #[tokio::test]
    async fn create_wallet_fails_on_duplicate_name() {
        let (state, user_id) = get_state();
        let form = WalletForm {
            name: "Cash".to_owned(),
            ..Default::default()
        };
        create_wallet_endpoint(State(state.clone()), Extension(user_id), Form(form.clone()))
            .await
            .into_response();

        let response = create_wallet_endpoint(State(state), Extension(user_id), Form(form))
            .await
            .into_response();

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: You already have a wallet named 'Cash'");
    }
}
