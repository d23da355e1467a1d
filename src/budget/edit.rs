//! Budget editing page and endpoint.

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
    budget::{
        Budget, BudgetId,
        form::{BudgetForm, BudgetFormOptions, budget_form_view},
        get_budget, update_budget,
    },
    category::{Category, get_categories},
    endpoints,
    html::{FormEndpoint, form_page},
    navigation::NavBar,
    timezone::local_today,
    wallet::{Wallet, get_wallets},
};

/// The state needed for the edit budget page and endpoint.
#[derive(Debug, Clone)]
pub struct EditBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The user's categories and the wallets the budget may use: the active
/// wallets plus the wallet it already uses.
fn load_options(
    budget: &Budget,
    user_id: UserID,
    connection: &Connection,
) -> Result<(Vec<Category>, Vec<Wallet>), Error> {
    let categories = get_categories(user_id, connection)?;
    let wallets = get_wallets(user_id, connection)?
        .into_iter()
        .filter(|wallet| wallet.is_active || wallet.id == budget.wallet_id)
        .collect();

    Ok((categories, wallets))
}

/// Render the budget editing page.
pub async fn get_edit_budget_page(
    Path(budget_id): Path<BudgetId>,
    State(state): State<EditBudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = get_budget(budget_id, user_id, &connection)?;
    let (categories, wallets) = load_options(&budget, user_id, &connection)?;
    let options = BudgetFormOptions {
        categories: &categories,
        wallets: &wallets,
        today,
    };
    let nav_bar = NavBar::new(&endpoints::format_endpoint(
        endpoints::EDIT_BUDGET_VIEW,
        budget_id,
    ))
    .into_html();

    Ok(form_page(
        "Edit Budget",
        nav_bar,
        edit_budget_form_view(budget_id, &BudgetForm::from(&budget), &options, ""),
    )
    .into_response())
}

/// Handle budget update form submission.
pub async fn update_budget_endpoint(
    Path(budget_id): Path<BudgetId>,
    State(state): State<EditBudgetState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let options = get_budget(budget_id, user_id, &connection)
        .and_then(|budget| load_options(&budget, user_id, &connection));
    let (categories, wallets) = match options {
        Ok(options) => options,
        Err(Error::NotFound) => return Error::NotFound.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not load budget {budget_id}: {error}");
            return error.into_alert_response();
        }
    };
    let options = BudgetFormOptions {
        categories: &categories,
        wallets: &wallets,
        today,
    };

    let update = match form.validate(today) {
        Ok(update) => update,
        Err(error) => {
            return edit_budget_form_view(budget_id, &form, &options, &format!("Error: {error}"))
                .into_response();
        }
    };

    match update_budget(budget_id, update, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::DuplicateBudget | Error::InactiveWallet(_))) => {
            edit_budget_form_view(budget_id, &form, &options, &format!("Error: {error}"))
                .into_response()
        }
        Err(error @ (Error::NotFound | Error::InvalidCategory | Error::InvalidWallet)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating budget {budget_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_budget_form_view(
    budget_id: BudgetId,
    values: &BudgetForm,
    options: &BudgetFormOptions<'_>,
    error_message: &str,
) -> Markup {
    let update_endpoint = endpoints::format_endpoint(endpoints::BUDGET, budget_id);

    budget_form_view(
        FormEndpoint::Put(&update_endpoint),
        values,
        options,
        error_message,
    )
}
