//! Category deletion endpoint.

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
    category::{CategoryId, delete_category},
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle category deletion. Returns a success alert or an error alert.
pub async fn delete_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<DeleteCategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_category(category_id, user_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(_) => Alert::SuccessSimple {
            message: "Category deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error @ (Error::NotFound | Error::CategoryInUse)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        category::{CategoryIcon, CategoryName, NewCategory, create_category},
        color::Color,
        db::initialize,
        user::create_test_user,
    };

    use super::{DeleteCategoryState, delete_category_endpoint};

    #[tokio::test]
    async fn delete_category_succeeds() {
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
        let state = DeleteCategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response =
            delete_category_endpoint(Path(category.id), State(state.clone()), Extension(user.id))
                .await
                .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response =
            delete_category_endpoint(Path(category.id), State(state), Extension(user.id))
                .await
                .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
