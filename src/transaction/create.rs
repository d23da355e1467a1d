//! Transaction creation page and endpoint.

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
    AppState, Error, UserID,
    category::get_categories,
    endpoints,
    html::{FormEndpoint, form_page},
    label::get_labels,
    navigation::NavBar,
    timezone::local_today,
    transaction::{
        create_transaction,
        form::{
            TransactionForm, TransactionFormOptions, missing_prerequisites_view,
            transaction_form_view,
        },
    },
    wallet::get_active_wallets,
};

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the page for recording a transaction.
pub async fn get_new_transaction_page(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)?;
    let wallets = get_active_wallets(user_id, &connection)?;
    let labels = get_labels(user_id, &connection)?;
    let options = TransactionFormOptions {
        categories: &categories,
        wallets: &wallets,
        labels: &labels,
        today,
    };

    let content = match missing_prerequisites_view(&options) {
        Some(message) => message,
        None => new_transaction_form_view(&TransactionForm::new_expense(today), &options, ""),
    };
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();

    Ok(form_page("New Transaction", nav_bar, content).into_response())
}

/// Handle transaction creation form submission.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let mut connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let (categories, wallets, labels) = match (
        get_categories(user_id, &connection),
        get_active_wallets(user_id, &connection),
        get_labels(user_id, &connection),
    ) {
        (Ok(categories), Ok(wallets), Ok(labels)) => (categories, wallets, labels),
        (Err(error), _, _) | (_, Err(error), _) | (_, _, Err(error)) => {
            tracing::error!("Could not load the transaction form options: {error}");
            return error.into_alert_response();
        }
    };
    let options = TransactionFormOptions {
        categories: &categories,
        wallets: &wallets,
        labels: &labels,
        today,
    };

    let new_transaction = match form.validate(today) {
        Ok(new_transaction) => new_transaction,
        Err(error @ (Error::InvalidCategory | Error::InvalidWallet)) => {
            return error.into_alert_response();
        }
        Err(error) => {
            return new_transaction_form_view(&form, &options, &format!("Error: {error}"))
                .into_response();
        }
    };

    match create_transaction(new_transaction, user_id, &mut connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::InactiveWallet(_)) => {
            new_transaction_form_view(&form, &options, &format!("Error: {error}")).into_response()
        }
        Err(error @ (Error::InvalidCategory | Error::InvalidWallet | Error::InvalidLabel)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");
            error.into_alert_response()
        }
    }
}

fn new_transaction_form_view(
    values: &TransactionForm,
    options: &TransactionFormOptions<'_>,
    error_message: &str,
) -> Markup {
    transaction_form_view(
        FormEndpoint::Post(endpoints::TRANSACTIONS_API),
        values,
        options,
        error_message,
    )
}

#[cfg(test)]
mod create_transaction_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use rust_decimal_macros::dec;
    use scraper::Selector;
    use time::{Duration, OffsetDateTime};

    use crate::{
        UserID,
        db::initialize,
        endpoints,
        money::Money,
        test_utils::{
            assert_form_error_message, assert_form_input, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, must_get_form, parse_html_document, parse_html_fragment,
        },
        transaction::{core::test_fixture::get_fixture, get_transactions},
        user::create_test_user,
        wallet::get_wallet,
    };

    use super::{
        CreateTransactionState, TransactionForm, create_transaction_endpoint,
        get_new_transaction_page,
    };

    struct TestContext {
        state: CreateTransactionState,
        user_id: UserID,
        category_id: i64,
        wallet_id: i64,
    }

    fn get_context() -> TestContext {
        let fixture = get_fixture();

        TestContext {
            user_id: fixture.user_id,
            category_id: fixture.category.id,
            wallet_id: fixture.wallet_a.id,
            state: CreateTransactionState {
                db_connection: Arc::new(Mutex::new(fixture.connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
        }
    }

    fn today() -> time::Date {
        OffsetDateTime::now_utc().date()
    }

    fn expense_form(context: &TestContext) -> TransactionForm {
        TransactionForm {
            amount: Some(dec!(50)),
            description: "Groceries".to_owned(),
            category_id: Some(context.category_id),
            wallet_id: Some(context.wallet_id),
            ..TransactionForm::new_expense(today())
        }
    }

    #[tokio::test]
    async fn page_explains_missing_prerequisites() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("test@example.com", &connection);
        let state = CreateTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_new_transaction_page(State(state), Extension(user.id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert!(html.select(&Selector::parse("form").unwrap()).next().is_none());
        assert!(
            html.select(&Selector::parse("[data-transaction-prerequisites]").unwrap())
                .next()
                .is_some()
        );
    }

    #[tokio::test]
    async fn page_shows_form() {
        let context = get_context();

        let response = get_new_transaction_page(State(context.state), Extension(context.user_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "date", "date");
    }

    #[tokio::test]
    async fn creating_expense_updates_wallet_balance() {
        let context = get_context();

        let response = create_transaction_endpoint(
            State(context.state.clone()),
            Extension(context.user_id),
            Form(expense_form(&context)),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let connection = context.state.db_connection.lock().unwrap();
        let wallet = get_wallet(context.wallet_id, context.user_id, &connection).unwrap();
        assert_eq!(wallet.balance, Money::new(dec!(950)));
        assert_eq!(
            get_transactions(context.user_id, None, &connection)
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn future_date_renders_form_error() {
        let context = get_context();
        let tomorrow = today() + Duration::days(1);
        let form = TransactionForm {
            date: tomorrow,
            ..expense_form(&context)
        };

        let response =
            create_transaction_endpoint(State(context.state.clone()), Extension(context.user_id), Form(form))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            &format!("Error: {tomorrow} is a date in the future, which is not allowed"),
        );
        let connection = context.state.db_connection.lock().unwrap();
        let wallet = get_wallet(context.wallet_id, context.user_id, &connection).unwrap();
        assert_eq!(wallet.balance, Money::new(dec!(1000)));
    }

    #[tokio::test]
    async fn other_users_wallet_is_rejected() {
        let context = get_context();
        let other_user =
            create_test_user("other@example.com", &context.state.db_connection.lock().unwrap());

        let response = create_transaction_endpoint(
            State(context.state.clone()),
            Extension(other_user.id),
            Form(expense_form(&context)),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let connection = context.state.db_connection.lock().unwrap();
        let wallet = get_wallet(context.wallet_id, context.user_id, &connection).unwrap();
        assert_eq!(wallet.balance, Money::new(dec!(1000)));
    }
}
