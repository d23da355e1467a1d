//! Budget creation page and endpoint.

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
    budget::{
        create_budget,
        form::{BudgetForm, BudgetFormOptions, budget_form_view, missing_prerequisites_view},
    },
    category::get_categories,
    endpoints,
    html::{FormEndpoint, form_page},
    navigation::NavBar,
    timezone::local_today,
    wallet::get_active_wallets,
};

/// The state needed for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateBudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the budget creation page.
///
/// If the user has no categories or no active wallets, the page explains
/// what to create first instead of showing the form.
pub async fn get_new_budget_page(
    State(state): State<CreateBudgetState>,
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
    let options = BudgetFormOptions {
        categories: &categories,
        wallets: &wallets,
        today,
    };

    let content = match missing_prerequisites_view(&options) {
        Some(message) => message,
        None => new_budget_form_view(&BudgetForm::for_month_of(today), &options, ""),
    };
    let nav_bar = NavBar::new(endpoints::NEW_BUDGET_VIEW).into_html();

    Ok(form_page("New Budget", nav_bar, content).into_response())
}

/// Handle budget creation form submission.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetState>,
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

    let (categories, wallets) = match (
        get_categories(user_id, &connection),
        get_active_wallets(user_id, &connection),
    ) {
        (Ok(categories), Ok(wallets)) => (categories, wallets),
        (Err(error), _) | (_, Err(error)) => {
            tracing::error!("Could not load the budget form options: {error}");
            return error.into_alert_response();
        }
    };
    let options = BudgetFormOptions {
        categories: &categories,
        wallets: &wallets,
        today,
    };

    let new_budget = match form.validate(today) {
        Ok(new_budget) => new_budget,
        Err(error) => {
            return new_budget_form_view(&form, &options, &format!("Error: {error}"))
                .into_response();
        }
    };

    match create_budget(new_budget, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::DuplicateBudget | Error::InactiveWallet(_))) => {
            new_budget_form_view(&form, &options, &format!("Error: {error}")).into_response()
        }
        Err(error @ (Error::InvalidCategory | Error::InvalidWallet)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget: {error}");
            error.into_alert_response()
        }
    }
}

fn new_budget_form_view(
    values: &BudgetForm,
    options: &BudgetFormOptions<'_>,
    error_message: &str,
) -> Markup {
    budget_form_view(
        FormEndpoint::Post(endpoints::BUDGETS_API),
        values,
        options,
        error_message,
    )
}
