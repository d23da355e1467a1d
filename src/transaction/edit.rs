//! Transaction editing page and endpoint.

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
    AppState, Error, UserID,
    category::{Category, get_categories},
    endpoints,
    html::{FormEndpoint, form_page},
    label::{Label, get_labels},
    navigation::NavBar,
    timezone::local_today,
    transaction::{
        Transaction, TransactionId,
        form::{TransactionForm, TransactionFormOptions, transaction_form_view},
        get_transaction, update_transaction,
    },
    wallet::{Wallet, get_wallets},
};

/// The state needed for the edit transaction page and endpoint.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

struct FormChoices {
    categories: Vec<Category>,
    wallets: Vec<Wallet>,
    labels: Vec<Label>,
}

/// The active wallets plus the wallet the transaction already uses.
fn load_choices(
    transaction: &Transaction,
    user_id: UserID,
    connection: &Connection,
) -> Result<FormChoices, Error> {
    let wallets = get_wallets(user_id, connection)?
        .into_iter()
        .filter(|wallet| wallet.is_active || wallet.id == transaction.wallet_id)
        .collect();

    Ok(FormChoices {
        categories: get_categories(user_id, connection)?,
        wallets,
        labels: get_labels(user_id, connection)?,
    })
}

impl FormChoices {
    fn options(&self, today: time::Date) -> TransactionFormOptions<'_> {
        TransactionFormOptions {
            categories: &self.categories,
            wallets: &self.wallets,
            labels: &self.labels,
            today,
        }
    }
}

/// Render the transaction editing page.
pub async fn get_edit_transaction_page(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, user_id, &connection)?;
    let choices = load_choices(&transaction, user_id, &connection)?;
    let nav_bar = NavBar::new(&endpoints::format_endpoint(
        endpoints::EDIT_TRANSACTION_VIEW,
        transaction_id,
    ))
    .into_html();

    Ok(form_page(
        "Edit Transaction",
        nav_bar,
        edit_transaction_form_view(
            transaction_id,
            &TransactionForm::from(&transaction),
            &choices.options(today),
            "",
        ),
    )
    .into_response())
}

/// Handle transaction update form submission.
///
/// The wallet balances are reconciled by [update_transaction].
pub async fn update_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<EditTransactionState>,
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

    let choices = get_transaction(transaction_id, user_id, &connection)
        .and_then(|transaction| load_choices(&transaction, user_id, &connection));
    let choices = match choices {
        Ok(choices) => choices,
        Err(Error::NotFound) => return Error::NotFound.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not load transaction {transaction_id}: {error}");
            return error.into_alert_response();
        }
    };
    let options = choices.options(today);

    let update = match form.validate(today) {
        Ok(update) => update,
        Err(error @ (Error::InvalidCategory | Error::InvalidWallet)) => {
            return error.into_alert_response();
        }
        Err(error) => {
            return edit_transaction_form_view(
                transaction_id,
                &form,
                &options,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    match update_transaction(transaction_id, update, user_id, &mut connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::InactiveWallet(_)) => edit_transaction_form_view(
            transaction_id,
            &form,
            &options,
            &format!("Error: {error}"),
        )
        .into_response(),
        Err(
            error @ (Error::NotFound
            | Error::InvalidCategory
            | Error::InvalidWallet
            | Error::InvalidLabel),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_transaction_form_view(
    transaction_id: TransactionId,
    values: &TransactionForm,
    options: &TransactionFormOptions<'_>,
    error_message: &str,
) -> Markup {
    let update_endpoint = endpoints::format_endpoint(endpoints::TRANSACTION, transaction_id);

    transaction_form_view(
        FormEndpoint::Put(&update_endpoint),
        values,
        options,
        error_message,
    )
}
