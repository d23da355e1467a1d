//! Category creation page and endpoint.

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
    category::{
        create_category,
        form::{CategoryForm, category_form_view},
    },
    endpoints,
    html::{FormEndpoint, form_page},
    navigation::NavBar,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category creation page.
pub async fn get_new_category_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW).into_html();

    form_page(
        "New Category",
        nav_bar,
        new_category_form_view(&CategoryForm::default(), ""),
    )
    .into_response()
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let new_category = match form.validate() {
        Ok(new_category) => new_category,
        Err(error) => {
            return new_category_form_view(&form, &format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(new_category, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DuplicateCategoryName(_)) => {
            new_category_form_view(&form, &format!("Error: {error}")).into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");
            error.into_alert_response()
        }
    }
}

fn new_category_form_view(values: &CategoryForm, error_message: &str) -> Markup {
    category_form_view(
        FormEndpoint::Post(endpoints::CATEGORIES_API),
        values,
        error_message,
    )
}
