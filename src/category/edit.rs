//! Category editing page and endpoint.

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
    category::{
        CategoryId,
        form::{CategoryForm, category_form_view},
        get_category, update_category,
    },
    endpoints,
    html::{FormEndpoint, form_page},
    navigation::NavBar,
};

/// The state needed for the edit category page and endpoint.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category editing page.
pub async fn get_edit_category_page(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, user_id, &connection)?;
    let nav_bar = NavBar::new(&endpoints::format_endpoint(
        endpoints::EDIT_CATEGORY_VIEW,
        category_id,
    ))
    .into_html();

    Ok(form_page(
        "Edit Category",
        nav_bar,
        edit_category_form_view(category_id, &CategoryForm::from(&category), ""),
    )
    .into_response())
}

/// Handle category update form submission.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryForm>,
) -> Response {
    let update = match form.validate() {
        Ok(update) => update,
        Err(error) => {
            return edit_category_form_view(category_id, &form, &format!("Error: {error}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(category_id, update, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DuplicateCategoryName(_)) => {
            edit_category_form_view(category_id, &form, &format!("Error: {error}"))
                .into_response()
        }
        Err(Error::NotFound) => Error::NotFound.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_category_form_view(
    category_id: CategoryId,
    values: &CategoryForm,
    error_message: &str,
) -> Markup {
    let update_endpoint = endpoints::format_endpoint(endpoints::CATEGORY, category_id);

    category_form_view(FormEndpoint::Put(&update_endpoint), values, error_message)
}

#[cfg(test)]
mod edit_category_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        Error, UserID,
        category::{
            Category, CategoryIcon, CategoryName, NewCategory, create_category, get_category,
        },
        color::Color,
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, must_get_form, parse_html_document,
        },
        user::create_test_user,
    };

    use super::{
        CategoryForm, EditCategoryState, get_edit_category_page, update_category_endpoint,
    };

    fn get_state() -> (EditCategoryState, UserID, Category) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("test@example.com", &connection);
        let category = create_category(
            NewCategory {
                name: CategoryName::new_unchecked("Groceries"),
                color: Color::Green,
                icon: CategoryIcon::ShoppingCart,
            },
            user.id,
            &connection,
        )
        .unwrap();

        (
            EditCategoryState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
            category,
        )
    }

    #[tokio::test]
    async fn edit_page_shows_category() {
        let (state, user_id, category) = get_state();

        let response =
            get_edit_category_page(Path(category.id), State(state), Extension(user_id))
                .await
                .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::CATEGORY, category.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Groceries");
    }

    #[tokio::test]
    async fn edit_page_for_missing_category_is_not_found() {
        let (state, user_id, _) = get_state();

        let result = get_edit_category_page(Path(999), State(state), Extension(user_id)).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn update_category_succeeds() {
        let (state, user_id, category) = get_state();
        let form = CategoryForm {
            name: "Food".to_owned(),
            color: Color::Red,
            icon: CategoryIcon::Utensils,
        };

        let response = update_category_endpoint(
            Path(category.id),
            State(state.clone()),
            Extension(user_id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);
        let updated =
            get_category(category.id, user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.name.as_ref(), "Food");
        assert_eq!(updated.icon, CategoryIcon::Utensils);
    }

    #[tokio::test]
    async fn update_other_users_category_is_not_found() {
        let (state, _, category) = get_state();
        let other_user = create_test_user("other@example.com", &state.db_connection.lock().unwrap());
        let form = CategoryForm {
            name: "Food".to_owned(),
            ..Default::default()
        };

        let response = update_category_endpoint(
            Path(category.id),
            State(state),
            Extension(other_user.id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
