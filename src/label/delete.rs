//! Label deletion endpoint.

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
    label::{LabelId, delete_label},
};

/// The state needed for deleting a label.
#[derive(Debug, Clone)]
pub struct DeleteLabelState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteLabelState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle label deletion. Returns a success alert or an error alert.
pub async fn delete_label_endpoint(
    Path(label_id): Path<LabelId>,
    State(state): State<DeleteLabelState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_label(label_id, user_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(_) => Alert::SuccessSimple {
            message: "Label deleted successfully".to_owned(),
        }
        .into_response(),
        Err(error @ (Error::NotFound | Error::LabelInUse)) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting label {label_id}: {error}");
            error.into_alert_response()
        }
    }
}
