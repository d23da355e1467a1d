//! Label creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
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
        create_label,
        form::{LabelForm, label_form_view},
    },
    navigation::NavBar,
};

/// The state needed for creating a label.
#[derive(Debug, Clone)]
pub struct CreateLabelState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateLabelState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the label creation page.
pub async fn get_new_label_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_LABEL_VIEW).into_html();
    let form = label_form_view(FormEndpoint::Post(endpoints::LABELS_API), "", "");

    form_page("New Label", nav_bar, form).into_response()
}

/// Handle label creation form submission.
pub async fn create_label_endpoint(
    State(state): State<CreateLabelState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<LabelForm>,
) -> Response {
    let error_view = |error: Error| {
        label_form_view(
            FormEndpoint::Post(endpoints::LABELS_API),
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

    match create_label(name, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::LABELS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DuplicateLabelName(_)) => error_view(error),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a label: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod create_label_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        UserID,
        db::initialize,
        endpoints,
        label::get_labels,
        test_utils::{
            assert_form_error_message, assert_form_input, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, must_get_form, parse_html_document, parse_html_fragment,
        },
        user::create_test_user,
    };

    use super::{CreateLabelState, LabelForm, create_label_endpoint, get_new_label_page};

    fn get_state() -> (CreateLabelState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_test_user("test@example.com", &connection);

        (
            CreateLabelState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn render_page() {
        let response = get_new_label_page().await;

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::LABELS_API, "hx-post");
        assert_form_input(&form, "name", "text");
    }

    #[tokio::test]
    async fn can_create_label() {
        let (state, user_id) = get_state();

        let response = create_label_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(LabelForm {
                name: "Holiday".to_owned(),
            }),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::LABELS_VIEW);
        let labels = get_labels(user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].name.as_ref(), "Holiday");
    }

    #[tokio::test]
    async fn duplicate_name_renders_form_error() {
        let (state, user_id) = get_state();
        let form = LabelForm {
            name: "Holiday".to_owned(),
        };
        create_label_endpoint(State(state.clone()), Extension(user_id), Form(form.clone()))
            .await
            .into_response();

        let response = create_label_endpoint(State(state), Extension(user_id), Form(form))
            .await
            .into_response();

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: You already have a label named 'Holiday'");
    }
}
