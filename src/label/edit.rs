//! Label editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID, endpoints,
    html::{FormEndpoint, form_page},
    label::{
        LabelId,
        form::{LabelForm, label_form_view},
        get_label, update_label,
    },
    navigation::NavBar,
};

/// The state needed for the edit label page and endpoint.
#[derive(Debug, Clone)]
pub struct EditLabelState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditLabelState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the label editing page.
pub async fn get_edit_label_page(
    Path(label_id): Path<LabelId>,
    State(state): State<EditLabelState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let label = get_label(label_id, user_id, &connection)?;
    let nav_bar =
        NavBar::new(&endpoints::format_endpoint(endpoints::EDIT_LABEL_VIEW, label_id)).into_html();
    let update_endpoint = endpoints::format_endpoint(endpoints::LABEL, label_id);
    let form = label_form_view(FormEndpoint::Put(&update_endpoint), label.name.as_ref(), "");

    Ok(form_page("Edit Label", nav_bar, form).into_response())
}

/// Handle label update form submission.
pub async fn update_label_endpoint(
    Path(label_id): Path<LabelId>,
    State(state): State<EditLabelState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<LabelForm>,
) -> Response {
    let update_endpoint = endpoints::format_endpoint(endpoints::LABEL, label_id);
    let error_view = |error: Error| {
        label_form_view(
            FormEndpoint::Put(&update_endpoint),
            &form.name,
            &format!("Error: {error}"),
        )
        .into_response()
    };

    let name = match form.validate() {
        Ok(name) => name,
        Err(error) => return error_view(error),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_label(label_id, name, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::LABELS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DuplicateLabelName(_)) => error_view(error),
        Err(Error::NotFound) => Error::NotFound.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating label {label_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod edit_label_tests {
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
        Error,
        db::initialize,
        endpoints,
        label::{LabelName, create_label, get_label},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document,
        },
        user::create_test_user,
    };

    use super::{EditLabelState, LabelForm, get_edit_label_page, update_label_endpoint};

    #[tokio::test]
    async fn edit_page_and_update() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("test@example.com", &connection);
        let label = create_label(LabelName::new_unchecked("Holiday"), user.id, &connection).unwrap();
        let state = EditLabelState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_edit_label_page(Path(label.id), State(state.clone()), Extension(user.id))
            .await
            .unwrap();
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::LABEL, label.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Holiday");

        let response = update_label_endpoint(
            Path(label.id),
            State(state.clone()),
            Extension(user.id),
            Form(LabelForm {
                name: "Travel".to_owned(),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let updated = get_label(label.id, user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.name.as_ref(), "Travel");
    }

    #[tokio::test]
    async fn edit_page_for_other_users_label_is_not_found() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("test@example.com", &connection);
        let other_user = create_test_user("other@example.com", &connection);
        let label = create_label(LabelName::new_unchecked("Holiday"), user.id, &connection).unwrap();
        let state = EditLabelState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let result =
            get_edit_label_page(Path(label.id), State(state), Extension(other_user.id)).await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }
}
